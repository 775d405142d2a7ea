// ============================================
// Block Types - Позиции, ориентации, цвета
// ============================================
// z везде в четвертях уровня: 4 ячейки на одну визуальную единицу.

use serde::{Deserialize, Serialize};
use ultraviolet::Vec3;

/// Ячеек по z на одну визуальную единицу высоты
pub const LEVELS_PER_UNIT: i32 = 4;

/// Ключ ячейки сетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    /// В четвертях уровня
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Соседняя ячейка по горизонтали в направлении `dir`, с новым z
    pub fn step(&self, orientation: Orientation, z: i32) -> Self {
        let (dx, dy) = orientation.dir();
        Self::new(self.x + dx, self.y + dy, z)
    }

    /// Мировая позиция основания ячейки (центр по x/y)
    pub fn world_base(&self) -> Vec3 {
        Vec3::new(
            self.x as f32,
            self.y as f32,
            self.z as f32 / LEVELS_PER_UNIT as f32,
        )
    }
}

/// Направление блока. Локальная +y блока смотрит сюда.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// -x
    Left,
    /// +y
    Up,
    /// +x
    Right,
    /// -y
    Down,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Left,
        Orientation::Up,
        Orientation::Right,
        Orientation::Down,
    ];

    /// Угол поворота в градусах (по часовой от +y)
    pub fn angle_degrees(self) -> f32 {
        match self {
            Orientation::Left => -90.0,
            Orientation::Up => 0.0,
            Orientation::Right => 90.0,
            Orientation::Down => 180.0,
        }
    }

    /// Шаг по сетке в этом направлении
    pub fn dir(self) -> (i32, i32) {
        match self {
            Orientation::Left => (-1, 0),
            Orientation::Up => (0, 1),
            Orientation::Right => (1, 0),
            Orientation::Down => (0, -1),
        }
    }

    /// Поворот на 90° против часовой
    pub fn rotate_left(self) -> Self {
        match self {
            Orientation::Left => Orientation::Down,
            Orientation::Up => Orientation::Left,
            Orientation::Right => Orientation::Up,
            Orientation::Down => Orientation::Right,
        }
    }

    /// Поворот на 90° по часовой
    pub fn rotate_right(self) -> Self {
        match self {
            Orientation::Left => Orientation::Up,
            Orientation::Up => Orientation::Right,
            Orientation::Right => Orientation::Down,
            Orientation::Down => Orientation::Left,
        }
    }

    /// Локальная точка -> мировые оси. Только перестановки и смена знака,
    /// поэтому общие границы соседних блоков совпадают бит в бит.
    pub fn rotate_point(self, p: Vec3) -> Vec3 {
        match self {
            Orientation::Up => p,
            Orientation::Right => Vec3::new(p.y, -p.x, p.z),
            Orientation::Down => Vec3::new(-p.x, -p.y, p.z),
            Orientation::Left => Vec3::new(-p.y, p.x, p.z),
        }
    }

    /// Обратное к `rotate_point`
    pub fn rotate_point_back(self, p: Vec3) -> Vec3 {
        match self {
            Orientation::Up => p,
            Orientation::Right => Vec3::new(-p.y, p.x, p.z),
            Orientation::Down => Vec3::new(-p.x, -p.y, p.z),
            Orientation::Left => Vec3::new(p.y, -p.x, p.z),
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "l" => Some(Orientation::Left),
            "u" => Some(Orientation::Up),
            "r" => Some(Orientation::Right),
            "d" => Some(Orientation::Down),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Orientation::Left => "l",
            Orientation::Up => "u",
            Orientation::Right => "r",
            Orientation::Down => "d",
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::Up
    }
}

/// Цвет багажа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LuggageColor {
    Red,
    Orange,
    Green,
    Blue,
}

impl LuggageColor {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "red" => Some(LuggageColor::Red),
            "orange" => Some(LuggageColor::Orange),
            "green" => Some(LuggageColor::Green),
            "blue" => Some(LuggageColor::Blue),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LuggageColor::Red => "red",
            LuggageColor::Orange => "orange",
            LuggageColor::Green => "green",
            LuggageColor::Blue => "blue",
        }
    }

    /// RGB для рендера
    pub fn rgb(self) -> [f32; 3] {
        match self {
            LuggageColor::Red => [0.8, 0.1, 0.1],
            LuggageColor::Orange => [0.9, 0.5, 0.1],
            LuggageColor::Green => [0.1, 0.7, 0.2],
            LuggageColor::Blue => [0.1, 0.3, 0.9],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotations_cycle() {
        for o in Orientation::ALL {
            assert_eq!(o.rotate_left().rotate_right(), o);
            assert_eq!(o.rotate_left().rotate_left().rotate_left().rotate_left(), o);
        }
        assert_eq!(Orientation::Up.rotate_right(), Orientation::Right);
        assert_eq!(Orientation::Up.rotate_left(), Orientation::Left);
    }

    #[test]
    fn test_rotate_point_matches_dir() {
        // Локальный "вперёд" совпадает с шагом по сетке
        for o in Orientation::ALL {
            let p = o.rotate_point(Vec3::new(0.0, 1.0, 0.0));
            let (dx, dy) = o.dir();
            assert_eq!((p.x, p.y), (dx as f32, dy as f32));
            // Локальная +x всегда справа
            let right = o.rotate_point(Vec3::new(1.0, 0.0, 0.0));
            let right_of = o.rotate_right().dir();
            assert_eq!((right.x, right.y), (right_of.0 as f32, right_of.1 as f32));
        }
    }

    #[test]
    fn test_rotate_point_back() {
        let p = Vec3::new(0.375, -0.5, 0.25);
        for o in Orientation::ALL {
            assert_eq!(o.rotate_point_back(o.rotate_point(p)), p);
        }
    }

    #[test]
    fn test_codes() {
        for o in Orientation::ALL {
            assert_eq!(Orientation::from_code(o.code()), Some(o));
        }
        assert_eq!(Orientation::from_code("x"), None);
        assert_eq!(Orientation::Right.angle_degrees(), 90.0);
        assert_eq!(Orientation::Left.angle_degrees(), -90.0);
        assert_eq!(LuggageColor::from_name("Blue"), Some(LuggageColor::Blue));
    }
}
