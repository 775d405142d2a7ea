// ============================================
// Cargo - Единица багажа
// ============================================
// Два состояния: Free (позицией владеет физика) и Scripted (позицией
// владеет лента). Писать позицию может только текущий владелец.

use serde::{Deserialize, Serialize};
use ultraviolet::{Rotor3, Vec3};

use crate::blocks::{BlockPos, LuggageColor};

/// Идентификатор багажа, уникален в пределах симуляции
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CargoId(pub u64);

/// Кто сейчас двигает багаж
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CargoState {
    /// Свободное тело в физике
    Free,
    /// Лежит на ленте блока `cell`
    Scripted {
        cell: BlockPos,
        /// Пройдено вдоль средней линии блока
        distance: f32,
        /// Смещение вправо от средней линии
        lateral: f32,
    },
}

#[derive(Debug, Clone)]
pub struct Cargo {
    pub id: CargoId,
    pub position: Vec3,
    pub rotation: Rotor3,
    pub velocity: Vec3,
    pub color: Option<LuggageColor>,
    pub state: CargoState,
}

impl Cargo {
    /// Новый багаж сразу свободен
    pub fn new(id: CargoId, position: Vec3, color: Option<LuggageColor>) -> Self {
        Self {
            id,
            position,
            rotation: Rotor3::identity(),
            velocity: Vec3::zero(),
            color,
            state: CargoState::Free,
        }
    }

    pub fn in_physics(&self) -> bool {
        self.state == CargoState::Free
    }

    /// Блок, на котором лежит багаж
    pub fn supporting(&self) -> Option<BlockPos> {
        match self.state {
            CargoState::Scripted { cell, .. } => Some(cell),
            CargoState::Free => None,
        }
    }

    /// Отдать багаж физике
    pub fn release(&mut self, velocity: Vec3) {
        self.state = CargoState::Free;
        self.velocity = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_flags() {
        let mut cargo = Cargo::new(CargoId(1), Vec3::new(1.0, 2.0, 1.0), Some(LuggageColor::Red));
        assert!(cargo.in_physics());
        assert_eq!(cargo.supporting(), None);

        let cell = BlockPos::new(1, 2, 0);
        cargo.state = CargoState::Scripted { cell, distance: 0.2, lateral: 0.0 };
        assert!(!cargo.in_physics());
        assert_eq!(cargo.supporting(), Some(cell));

        cargo.release(Vec3::new(1.0, 0.0, 0.0));
        assert!(cargo.in_physics());
        assert_eq!(cargo.velocity.x, 1.0);
    }
}
