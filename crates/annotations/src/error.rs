use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnnotationError>;

#[derive(Error, Debug)]
pub enum AnnotationError {
    /// Encoded identity did not split into exactly file, segment and field.
    #[error("Malformed annotation identity '{key}': expected 3 parts, found {parts}")]
    MalformedKey { key: String, parts: usize },

    #[error("Annotation identity has an empty {component}")]
    EmptyComponent { component: &'static str },

    #[error("Annotation {component} '{value}' contains the reserved delimiter '<>'")]
    ReservedDelimiter {
        component: &'static str,
        value: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}
