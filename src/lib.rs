// ============================================
// Luggage Belt - Ядро конструктора конвейеров
// ============================================
// Воксельная сетка блоков, топология ленты, геометрия, физика, багаж.
// Окна, ввод и GUI живут снаружи и общаются через systems.

pub mod blocks;
pub mod grid;
pub mod topology;
pub mod geometry;
pub mod physics;
pub mod cargo;
pub mod level;

pub mod state;
pub mod systems;

pub use state::{SimConfig, SimulationContext, SimStatus, SimEvent};
pub use systems::{EditSystem, LevelSystem, SimulationSystem, ViewSystem};
