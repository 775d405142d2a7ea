// ============================================
// State Module - Конфигурация и контекст симуляции
// ============================================

mod config;
mod resources;

pub use config::{ConfigError, SimConfig};
pub use resources::{SimEvent, SimStatus, SimulationContext};
