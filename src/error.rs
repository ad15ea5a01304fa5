use thiserror::Error;

/// Errors raised while normalizing one filing.
///
/// `ValueCoercion` is recoverable at fact granularity: the pipeline skips
/// the fact, logs it and keeps a count. The other kinds are filing-fatal —
/// classification depends on the relationship graph, so a filing that
/// trips them contributes no output rows at all.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("unable to parse value for concept {concept}: {reason}")]
    ValueCoercion { concept: String, reason: String },

    #[error("malformed relationship graph: {0}")]
    RelationshipGraph(String),

    #[error("cycle detected in calculation graph at concept {0}")]
    CycleDetected(String),
}

impl NormalizeError {
    pub fn coercion(concept: &str, reason: impl Into<String>) -> Self {
        NormalizeError::ValueCoercion {
            concept: concept.to_string(),
            reason: reason.into(),
        }
    }

    /// True when processing of the whole filing must stop.
    pub fn is_filing_fatal(&self) -> bool {
        !matches!(self, NormalizeError::ValueCoercion { .. })
    }
}
