use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid interaction type: {0} (expected CHAT|EMAIL|TICKET|FORM)")]
    InvalidInteractionType(String),
    #[error("invalid page size: {0}")]
    InvalidPageSize(u32),
}
