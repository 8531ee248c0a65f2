use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed record{}: {message}", index_suffix(.index))]
    MalformedRecord {
        index: Option<usize>,
        message: String,
    },
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

fn index_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" at index {i}")).unwrap_or_default()
}

impl VisualizerError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn malformed_record(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index: None,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Attaches the batch position to a record-level error. Other variants pass through.
    pub(crate) fn at_index(self, at: usize) -> Self {
        match self {
            Self::MalformedRecord { message, .. } => Self::MalformedRecord {
                index: Some(at),
                message,
            },
            other => other,
        }
    }

    pub fn is_malformed_record(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}
