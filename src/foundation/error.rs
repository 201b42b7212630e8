/// Result alias used across the crate.
pub type DollResult<T> = Result<T, DollError>;

/// Errors surfaced by generation, with stable display prefixes.
#[derive(thiserror::Error, Debug)]
pub enum DollError {
    /// Invalid or inconsistent configuration (unknown folder, empty component, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// A layer file could not be matched to exactly one file on disk.
    #[error("file resolution error: {0}")]
    Resolve(String),

    /// YAML/JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// I/O, decode and encode failures with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DollError {
    /// Build a [`DollError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`DollError::Resolve`].
    pub fn resolve(msg: impl Into<String>) -> Self {
        Self::Resolve(msg.into())
    }

    /// Build a [`DollError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
