use thiserror::Error;

use crate::types::{RegionId, ShipId};

#[derive(Error, Debug)]
pub enum SkirmishError {
    #[error("Ship not found: {0:?}")]
    ShipNotFound(ShipId),

    #[error("Region not found: {0:?}")]
    RegionNotFound(RegionId),

    #[error("Invalid design '{design}': {reason}")]
    InvalidDesign { design: String, reason: String },

    #[error("Invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkirmishError>;
