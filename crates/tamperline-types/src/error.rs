//! Error types for the event model.

/// Errors that can occur while serializing an [`Event`](crate::Event)
/// into its canonical form.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A detail entry has an empty field name.
    #[error("event detail has an empty field name")]
    EmptyFieldName,

    /// A score field holds NaN or an infinity, which JSON cannot carry.
    #[error("non-finite score in field `{field}`")]
    NonFiniteScore {
        /// Name of the offending field.
        field: String,
    },

    /// The JSON encoder failed.
    #[error("json encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
