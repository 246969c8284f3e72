use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine has not been started")]
    NotStarted,

    #[error("claim stake not found: {0:?}")]
    StakeNotFound(crate::core::types::StakeId),

    #[error("unknown planet archetype: {0}")]
    UnknownPlanet(String),

    #[error("unknown building definition: {0}")]
    UnknownBuilding(String),

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("unknown tag: {0}")]
    UnknownTag(String),

    #[error("invalid speed multiplier: {0} (must be >= 0)")]
    InvalidSpeed(f32),

    #[error("catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
