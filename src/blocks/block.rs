// ============================================
// Block - Блок сетки и его вариант
// ============================================

use serde::{Deserialize, Serialize};
use ultraviolet::Vec3;

use super::types::{BlockPos, LuggageColor, Orientation};

/// Высота обычного блока в четвертях уровня
pub const BLOCK_HEIGHT: i32 = 4;
/// Рампа выше на четверть
pub const RAMP_HEIGHT: i32 = 5;

/// Политика генерации багажа на входе
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPolicy {
    /// None = без ограничения
    pub count: Option<u32>,
    /// None = багаж без цвета
    pub colors: Option<Vec<LuggageColor>>,
    /// Период генерации, секунды
    pub interval: f32,
}

impl EntryPolicy {
    pub fn new(count: Option<u32>, colors: Option<Vec<LuggageColor>>, interval: f32) -> Self {
        Self { count, colors, interval }
    }

    /// Можно ли сгенерировать ещё один
    pub fn allows(&self, generated: u32) -> bool {
        self.count.map_or(true, |limit| generated < limit)
    }
}

impl Default for EntryPolicy {
    fn default() -> Self {
        Self::new(None, None, 4.0)
    }
}

/// Политика приёма багажа на выходе
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExitPolicy {
    /// None = принимает всё
    pub accepted: Option<Vec<LuggageColor>>,
}

impl ExitPolicy {
    pub fn new(accepted: Option<Vec<LuggageColor>>) -> Self {
        Self { accepted }
    }

    pub fn accepts(&self, color: Option<LuggageColor>) -> bool {
        match (&self.accepted, color) {
            (None, _) => true,
            (Some(list), Some(c)) => list.contains(&c),
            (Some(_), None) => false,
        }
    }
}

/// Вариант блока. Геометрия диспетчеризуется по тегу, без иерархии.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockKind {
    Flat,
    Ascending,
    Descending,
    BendLeft,
    BendRight,
    Entry(EntryPolicy),
    Exit(ExitPolicy),
    /// Не лента: опора/стена
    Support,
}

impl BlockKind {
    /// Короткий код для файлов уровней
    pub fn code(&self) -> &'static str {
        match self {
            BlockKind::Flat => "cf",
            BlockKind::Ascending => "ca",
            BlockKind::Descending => "cd",
            BlockKind::BendLeft => "cbl",
            BlockKind::BendRight => "cbr",
            BlockKind::Entry(_) => "en",
            BlockKind::Exit(_) => "ex",
            BlockKind::Support => "sp",
        }
    }

    /// Вариант по коду (политики по умолчанию)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "cf" => Some(BlockKind::Flat),
            "ca" => Some(BlockKind::Ascending),
            "cd" => Some(BlockKind::Descending),
            "cbl" => Some(BlockKind::BendLeft),
            "cbr" => Some(BlockKind::BendRight),
            "en" => Some(BlockKind::Entry(EntryPolicy::default())),
            "ex" => Some(BlockKind::Exit(ExitPolicy::default())),
            "sp" => Some(BlockKind::Support),
            _ => None,
        }
    }

    pub fn is_belt(&self) -> bool {
        !matches!(self, BlockKind::Support)
    }

    pub fn is_ramp(&self) -> bool {
        matches!(self, BlockKind::Ascending | BlockKind::Descending)
    }

    /// Высота в четвертях
    pub fn height(&self) -> i32 {
        if self.is_ramp() { RAMP_HEIGHT } else { BLOCK_HEIGHT }
    }

    /// (вход, выход) ленты относительно основания, в четвертях
    pub fn belt_levels(&self) -> (i32, i32) {
        match self {
            BlockKind::Ascending => (0, 1),
            BlockKind::Descending => (1, 0),
            _ => (0, 0),
        }
    }
}

/// Блок на сетке
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub pos: BlockPos,
    pub orientation: Orientation,
    pub kind: BlockKind,
    pub deletable: bool,
    /// Только для пульсации перед удалением
    #[serde(skip, default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl Block {
    pub fn new(pos: BlockPos, orientation: Orientation, kind: BlockKind) -> Self {
        Self {
            pos,
            orientation,
            kind,
            deletable: true,
            scale: 1.0,
        }
    }

    /// Неудаляемый блок уровня
    pub fn fixed(pos: BlockPos, orientation: Orientation, kind: BlockKind) -> Self {
        Self { deletable: false, ..Self::new(pos, orientation, kind) }
    }

    pub fn height(&self) -> i32 {
        self.kind.height()
    }

    pub fn is_belt(&self) -> bool {
        self.kind.is_belt()
    }

    /// Направление, в котором лента принимает груз
    pub fn in_orientation(&self) -> Orientation {
        self.orientation
    }

    /// Направление, в котором лента отдаёт груз
    pub fn out_orientation(&self) -> Orientation {
        match self.kind {
            BlockKind::BendLeft => self.orientation.rotate_left(),
            BlockKind::BendRight => self.orientation.rotate_right(),
            _ => self.orientation,
        }
    }

    /// z, на котором лента входит в блок
    pub fn in_level(&self) -> i32 {
        self.pos.z + self.kind.belt_levels().0
    }

    /// z, на котором лента выходит из блока
    pub fn out_level(&self) -> i32 {
        self.pos.z + self.kind.belt_levels().1
    }

    pub fn entry_policy(&self) -> Option<&EntryPolicy> {
        match &self.kind {
            BlockKind::Entry(policy) => Some(policy),
            _ => None,
        }
    }

    pub fn exit_policy(&self) -> Option<&ExitPolicy> {
        match &self.kind {
            BlockKind::Exit(policy) => Some(policy),
            _ => None,
        }
    }

    /// Локальная точка -> мир (поворот, затем перенос в ячейку)
    pub fn local_to_world(&self, p: Vec3) -> Vec3 {
        self.orientation.rotate_point(p) + self.pos.world_base()
    }

    /// Мир -> локальная точка
    pub fn world_to_local(&self, p: Vec3) -> Vec3 {
        self.orientation.rotate_point_back(p - self.pos.world_base())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bend_out_orientation() {
        let pos = BlockPos::new(0, 0, 0);
        let left = Block::new(pos, Orientation::Up, BlockKind::BendLeft);
        let right = Block::new(pos, Orientation::Up, BlockKind::BendRight);
        assert_eq!(left.out_orientation(), Orientation::Left);
        assert_eq!(right.out_orientation(), Orientation::Right);
        assert_eq!(right.in_orientation(), Orientation::Up);
    }

    #[test]
    fn test_ramp_levels() {
        let pos = BlockPos::new(1, 1, 4);
        let up = Block::new(pos, Orientation::Up, BlockKind::Ascending);
        let down = Block::new(pos, Orientation::Up, BlockKind::Descending);
        assert_eq!((up.in_level(), up.out_level()), (4, 5));
        assert_eq!((down.in_level(), down.out_level()), (5, 4));
        assert_eq!(up.height(), RAMP_HEIGHT);
    }

    #[test]
    fn test_exit_policy() {
        let any = ExitPolicy::default();
        assert!(any.accepts(None));
        assert!(any.accepts(Some(LuggageColor::Red)));

        let red = ExitPolicy::new(Some(vec![LuggageColor::Red]));
        assert!(red.accepts(Some(LuggageColor::Red)));
        assert!(!red.accepts(Some(LuggageColor::Blue)));
        assert!(!red.accepts(None));
    }

    #[test]
    fn test_entry_policy_limit() {
        let policy = EntryPolicy::new(Some(2), None, 4.0);
        assert!(policy.allows(1));
        assert!(!policy.allows(2));
        assert!(EntryPolicy::default().allows(1000));
    }

    #[test]
    fn test_world_roundtrip() {
        let b = Block::new(BlockPos::new(3, 2, 4), Orientation::Right, BlockKind::Flat);
        let local = Vec3::new(-0.375, 0.5, 0.375);
        let world = b.local_to_world(local);
        assert_eq!(world, Vec3::new(3.5, 2.375, 1.375));
        assert_eq!(b.world_to_local(world), local);
    }

    #[test]
    fn test_codes_roundtrip() {
        for code in ["cf", "ca", "cd", "cbl", "cbr", "en", "ex", "sp"] {
            let kind = BlockKind::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert!(BlockKind::from_code("zz").is_none());
    }
}
