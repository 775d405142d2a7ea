// ============================================
// Topology Module - Связность ленты
// ============================================

mod neighbors;

pub use neighbors::*;
