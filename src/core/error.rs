use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncounterError {
    #[error("Boss not found: {0:?}")]
    BossNotFound(crate::core::types::ActorId),

    #[error("Invalid pattern graph: {0}")]
    InvalidPatternGraph(String),

    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EncounterError>;
