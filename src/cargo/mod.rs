// ============================================
// Cargo Module - Багаж и его движение по ленте
// ============================================

mod cargo;
mod motion;
mod spawn;

pub use cargo::*;
pub use motion::*;
pub use spawn::*;
