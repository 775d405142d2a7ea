// ============================================
// Level Module - Описание уровней
// ============================================

mod level;

pub use level::*;
