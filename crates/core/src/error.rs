use crate::types::DbId;
use crate::validator::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// One or more fields failed validation. Carries every failing field
    /// with the first message recorded for it.
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// The stored record changed since the caller read it.
    #[error("Edit conflict: {entity} with id {id} was modified concurrently")]
    EditConflict { entity: &'static str, id: DbId },
}
