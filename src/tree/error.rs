use thiserror::Error;

use crate::Id;

/// Errors that can occur during interval tree operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("busy time `{0}` is already indexed")]
    DuplicateId(Id),

    #[error("busy time `{0}` is not indexed")]
    NotFound(Id),
}
