// ============================================
// Blocks Module - Типы блоков конвейера
// ============================================

mod types;
mod block;

pub use types::*;
pub use block::*;
