// ============================================
// Grid Module - Плотная сетка блоков
// ============================================

mod block_grid;
mod error;

pub use block_grid::*;
pub use error::GridError;
