use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid buyer id `{0}` (expected a positive integer)")]
    InvalidBuyerId(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("input failure: {0}")]
    Input(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "invalid_input",
            Self::Input(_) => "input",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Domain(_) | Self::Input(_) => 3,
        }
    }
}
