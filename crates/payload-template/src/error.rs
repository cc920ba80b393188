//! Error types for template loading, evaluation and rendering.

use std::path::PathBuf;

/// Errors raised while loading a template file.
///
/// A load error is fatal to construction: no [`crate::Generator`] is produced.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Template file could not be read
    #[error("Failed to read template file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content is not a valid JSON template
    #[error("Failed to parse JSON template: {0}")]
    Json(#[source] serde_json::Error),

    /// Content is not a valid YAML template
    #[error("Failed to parse YAML template: {0}")]
    Yaml(#[source] serde_yaml::Error),

    /// Format was auto-detected and neither parser accepted the content
    #[error("Failed to parse template as YAML or JSON: YAML error: {yaml}, JSON error: {json}")]
    Undetected {
        yaml: serde_yaml::Error,
        json: serde_json::Error,
    },
}

/// Errors raised while evaluating substitution functions.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    /// The OS randomness source refused to produce bytes
    #[error("Failed to draw random bytes for substitution '{key}': {source}")]
    Randomness {
        key: String,
        #[source]
        source: rand::Error,
    },
}

/// Errors raised while interpolating evaluated values into the template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The template body could not be serialized to JSON text
    #[error("Failed to serialize template: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The serialized template contains an action that is not a placeholder
    #[error("Invalid placeholder at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// A placeholder names a key that is absent from the substitution mapping
    #[error("Placeholder references unknown substitution key: {0}")]
    MissingKey(String),
}

/// Error returned by [`crate::Generator::generate`].
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Failed to build substitutions: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Failed to render template: {0}")]
    Render(#[from] RenderError),
}

/// Reasons a `{{@...}}` token is not a recognized function call.
///
/// These are diagnostics only; the evaluator treats a malformed call as
/// literal text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DslError {
    #[error("no function token found")]
    NoToken,

    #[error("unterminated function token starting at offset {0}")]
    Unterminated(usize),

    #[error("function token has an empty name")]
    EmptyName,

    #[error("unknown function '@{0}'")]
    UnknownFunction(String),

    #[error("function '@{0}' does not take an argument")]
    UnexpectedArgument(String),

    #[error("invalid digit count '{0}' for '@rnd'")]
    InvalidDigits(String),

    #[error("unexpected character {found:?} in function token")]
    UnexpectedChar { found: char },
}
