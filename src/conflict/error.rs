use thiserror::Error;

use crate::tree::TreeError;
use crate::Id;

/// Errors that can occur during conflict tracking operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverlapError {
    #[error("busy time `{0}` is already tracked")]
    DuplicateId(Id),

    #[error("busy time `{0}` is not tracked")]
    NotFound(Id),

    #[error("a previous update did not complete; call reset() to recover")]
    UpdateInProgress,
}

impl From<TreeError> for OverlapError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::DuplicateId(id) => OverlapError::DuplicateId(id),
            TreeError::NotFound(id) => OverlapError::NotFound(id),
        }
    }
}
