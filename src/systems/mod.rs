// ============================================
// Systems Module - Системы над контекстом симуляции
// ============================================

mod edit_system;
mod simulation_system;
mod level_system;
mod view_system;

pub use edit_system::EditSystem;
pub use simulation_system::SimulationSystem;
pub use level_system::LevelSystem;
pub use view_system::{ViewSystem, CargoView};
