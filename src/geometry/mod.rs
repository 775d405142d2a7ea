// ============================================
// Geometry Module - Геометрия ленты и корпуса
// ============================================
// Всё в локальной системе блока: центр ячейки в (0, 0), основание z = 0,
// лента идёт вдоль +y, правая сторона +x. Поворот и перенос в мир
// делает вызывающий (Block::local_to_world).

mod arc;
mod shape;
mod edges;
mod hull;
mod vertex;

pub use arc::*;
pub use shape::*;
pub use edges::*;
pub use hull::*;
pub use vertex::*;

/// Радиус валиков ленты
pub const ROLLER_RADIUS: f32 = 0.125;
/// Центры валиков по y (±)
pub const ROLLER_OFFSET: f32 = 0.375;
/// Полуширина ленты (боковые кромки по x)
pub const BELT_HALF_WIDTH: f32 = 0.375;
/// Полуразмер ячейки
pub const HALF_BLOCK: f32 = 0.5;

/// Сегментов на четверть окружности валика
pub const CAP_SEGMENTS: u32 = 8;
/// Сегментов дуги поворота по умолчанию
pub const DEFAULT_BEND_SEGMENTS: u32 = 16;

/// Подъём рампы: 3 по горизонтали на 1 по вертикали
pub const INCLINE_RUN: f32 = 3.0;
pub const INCLINE_RISE: f32 = 1.0;

/// Сдвиг против z-fighting
pub const Z_DELTA: f32 = 1.0 / 1024.0;

/// Единиц текстуры на единицу длины ленты
pub const TEXTURE_SCALE: f32 = 8.0;
