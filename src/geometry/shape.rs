// ============================================
// Belt Shape - Таблица параметров по типу ленты
// ============================================

use crate::blocks::BlockKind;
use crate::topology::NeighborPair;
use super::{HALF_BLOCK, INCLINE_RISE, INCLINE_RUN, ROLLER_OFFSET, ROLLER_RADIUS};

/// Куда поворачивает лента внутри блока
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Straight,
    Left,
    Right,
}

/// Тег формы ленты. Вся геометрия диспетчеризуется по нему.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeltShape {
    Flat,
    Ascending,
    Descending,
    BendLeft,
    BendRight,
    Entry,
    Exit,
}

impl BeltShape {
    pub const ALL: [BeltShape; 7] = [
        BeltShape::Flat,
        BeltShape::Ascending,
        BeltShape::Descending,
        BeltShape::BendLeft,
        BeltShape::BendRight,
        BeltShape::Entry,
        BeltShape::Exit,
    ];

    /// None для блоков без ленты
    pub fn of(kind: &BlockKind) -> Option<Self> {
        match kind {
            BlockKind::Flat => Some(BeltShape::Flat),
            BlockKind::Ascending => Some(BeltShape::Ascending),
            BlockKind::Descending => Some(BeltShape::Descending),
            BlockKind::BendLeft => Some(BeltShape::BendLeft),
            BlockKind::BendRight => Some(BeltShape::BendRight),
            BlockKind::Entry(_) => Some(BeltShape::Entry),
            BlockKind::Exit(_) => Some(BeltShape::Exit),
            BlockKind::Support => None,
        }
    }

    pub fn turn(self) -> Turn {
        match self {
            BeltShape::BendLeft => Turn::Left,
            BeltShape::BendRight => Turn::Right,
            _ => Turn::Straight,
        }
    }

    /// z центров заднего и переднего валиков
    pub fn roller_centers(self) -> (f32, f32) {
        let low = 2.0 * ROLLER_RADIUS;
        // Рампа поднимается на четверть уровня на длине 2·ROLLER_OFFSET
        let rise = 2.0 * ROLLER_OFFSET * INCLINE_RISE / INCLINE_RUN;
        match self {
            BeltShape::Ascending => (low, low + rise),
            BeltShape::Descending => (low + rise, low),
            _ => (low, low),
        }
    }

    /// Верх ленты над задним и передним валиком
    pub fn belt_tops(self) -> (f32, f32) {
        let (back, front) = self.roller_centers();
        (back + ROLLER_RADIUS, front + ROLLER_RADIUS)
    }

    pub fn max_top(self) -> f32 {
        let (back, front) = self.belt_tops();
        back.max(front)
    }

    /// Наклонная лента: ровный участок, подъём 3:1, ровный участок
    pub fn is_ramp(self) -> bool {
        matches!(self, BeltShape::Ascending | BeltShape::Descending)
    }

    /// Задний конец всегда обрезан ровно (вход)
    pub fn squared_back(self) -> bool {
        self == BeltShape::Entry
    }

    /// Передний конец всегда обрезан ровно (выход)
    pub fn squared_front(self) -> bool {
        self == BeltShape::Exit
    }

    /// Высота верха ленты в точке локального y прямой ленты
    pub fn top_at(self, y: f32) -> f32 {
        let (back, front) = self.belt_tops();
        if y <= -ROLLER_OFFSET {
            back
        } else if y >= ROLLER_OFFSET {
            front
        } else {
            let t = (y + ROLLER_OFFSET) / (2.0 * ROLLER_OFFSET);
            back + (front - back) * t
        }
    }

    /// Длина средней линии пути груза через блок
    pub fn path_length(self) -> f32 {
        match self.turn() {
            Turn::Straight => 2.0 * HALF_BLOCK,
            _ => 2.0 * (HALF_BLOCK - ROLLER_OFFSET) + bend_pivot_radius() * std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Радиус средней линии поворота
pub fn bend_pivot_radius() -> f32 {
    ROLLER_OFFSET
}

/// Есть ли сосед с каждой стороны
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NeighborLinks {
    pub upstream: bool,
    pub downstream: bool,
}

impl NeighborLinks {
    pub const NONE: NeighborLinks = NeighborLinks { upstream: false, downstream: false };
    pub const BOTH: NeighborLinks = NeighborLinks { upstream: true, downstream: true };

    pub fn new(upstream: bool, downstream: bool) -> Self {
        Self { upstream, downstream }
    }
}

impl From<NeighborPair> for NeighborLinks {
    fn from(pair: NeighborPair) -> Self {
        Self::new(pair.upstream.is_some(), pair.downstream.is_some())
    }
}
