use thiserror::Error;

use crate::color::ColorError;
use crate::config::ConfigError;
use crate::model::LoadError;

#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("load: {0}")]
    Load(#[from] LoadError),
    #[error("colour: {0}")]
    Color(#[from] ColorError),
    #[error("details: {0}")]
    Details(String),
}
