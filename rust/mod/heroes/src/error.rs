use heroes_kv::KVError;
use thiserror::Error;

/// Message for a creation candidate missing name, alter ego, publisher or
/// powers.
pub const MISSING_REQUIRED_FIELDS: &str = "Invalid hero: missing required fields";

#[derive(Error, Debug)]
pub enum HeroError {
    /// Creation candidate rejected. Nothing was stored.
    #[error("{0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("serialization: {0}")]
    Serialization(String),
}

impl HeroError {
    pub fn missing_required_fields() -> Self {
        HeroError::Validation(MISSING_REQUIRED_FIELDS.to_string())
    }
}

impl From<KVError> for HeroError {
    fn from(e: KVError) -> Self {
        match e {
            KVError::Serialization(msg) => HeroError::Serialization(msg),
            other => HeroError::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for HeroError {
    fn from(e: serde_json::Error) -> Self {
        HeroError::Serialization(e.to_string())
    }
}
