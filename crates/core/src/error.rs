use thiserror::Error;

use crate::board::PileKind;

/// Malformed command; the board is left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("{pile} index {index} out of range (len {len})")]
    IndexOutOfRange {
        pile: PileKind,
        index: usize,
        len: usize,
    },
}

impl MoveError {
    pub(crate) fn check_index(pile: PileKind, index: usize, len: usize) -> Result<(), Self> {
        if index < len {
            Ok(())
        } else {
            Err(MoveError::IndexOutOfRange { pile, index, len })
        }
    }
}
