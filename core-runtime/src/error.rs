use thiserror::Error;

/// Failures while assembling the runtime: configuration and logging setup
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected configuration value, bad log filter, or a second logging init
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A host bridge the dataset service needs was not injected
    #[error("Missing {capability} bridge: {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
