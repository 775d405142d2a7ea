// ============================================
// Grid Error - Ошибки операций над сеткой
// ============================================

use thiserror::Error;

use crate::blocks::BlockPos;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell {0:?} is outside the field")]
    OutOfBounds(BlockPos),

    #[error("cell {0:?} is empty")]
    EmptyCell(BlockPos),

    #[error("block at {pos:?} overlaps block at {other:?}")]
    Overlap { pos: BlockPos, other: BlockPos },

    #[error("block limit of {0} reached")]
    LimitReached(u32),

    #[error("block at {0:?} cannot be deleted")]
    NotDeletable(BlockPos),
}
