use crate::{config, model};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("model error: {0}")]
    Model(#[from] model::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
