pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to build the 'Environment' from the provided string: {0}")]
    StringToEnvironmentFail(String),
    #[error("invalid mailing list group id: {0}")]
    InvalidGroupId(String),
    #[error("invalid analytics tracking id: {0}")]
    InvalidTrackingId(String),

    #[error("figment extraction error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}
