use thiserror::Error;

/// Errors raised by the reconciliation and aggregation stages.
///
/// Every stage fails fast: the error is returned at the point of detection
/// and nothing downstream runs. Duplicate transaction ids are not an error;
/// they are collapsed by the deduplicator and only reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Invalid or missing invocation parameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An input table lacks an expected column, or carries an unusable value.
    #[error("schema error in {table}: {detail}")]
    Schema { table: String, detail: String },

    /// A stage received a valid but empty collection it cannot work with.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// An amount left the representable decimal range.
    #[error("arithmetic overflow: {0}")]
    Overflow(String),
}

impl PipelineError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn schema(table: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            detail: detail.into(),
        }
    }

    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput(message.into())
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::Overflow(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::schema("GLEIF.csv", "missing column `lei`");
        assert_eq!(
            err.to_string(),
            "schema error in GLEIF.csv: missing column `lei`"
        );
        assert_eq!(
            PipelineError::configuration("no trade repository supplied").to_string(),
            "configuration error: no trade repository supplied"
        );
    }
}
