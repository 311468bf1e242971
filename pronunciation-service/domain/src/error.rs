use thiserror::Error;

/// Failures raised by the analysis pipeline ports.
///
/// The first five variants are the pipeline taxonomy; the use case converts
/// every one of them into a zero-score report instead of returning it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("failed to fetch {resource}: {message}")]
    ResourceFetch { resource: String, message: String },

    #[error("{message}")]
    Io { message: String },

    #[error("MFA alignment failed: {message}")]
    Alignment { message: String },

    #[error("TextGrid file not found at {path}. Alignment may have failed.")]
    AlignmentOutputMissing { path: String },

    #[error("Failed to parse alignment results: {message}")]
    Inspection { message: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn resource_fetch(resource: &str, message: &str) -> Self {
        Self::ResourceFetch {
            resource: resource.to_string(),
            message: message.to_string(),
        }
    }

    pub fn io(context: &str, error: &std::io::Error) -> Self {
        Self::Io {
            message: format!("{context}: {error}"),
        }
    }

    pub fn alignment(message: &str) -> Self {
        Self::Alignment {
            message: message.to_string(),
        }
    }

    pub fn alignment_output_missing(path: &std::path::Path) -> Self {
        Self::AlignmentOutputMissing {
            path: path.display().to_string(),
        }
    }

    pub fn inspection(message: &str) -> Self {
        Self::Inspection {
            message: message.to_string(),
        }
    }

    pub fn invalid_input(message: &str) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self::Internal {
            message: message.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ResourceFetch { .. } => "resource_fetch",
            Self::Io { .. } => "io",
            Self::Alignment { .. } => "alignment",
            Self::AlignmentOutputMissing { .. } => "alignment_output_missing",
            Self::Inspection { .. } => "inspection",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Internal { .. } => "internal",
        }
    }
}
