//! Error types for pdrive core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::InvalidConfig(_) => "InvalidConfig",
            Error::InvalidUrl(_) => "InvalidUrl",
            Error::Io(_) => "Io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidArgument("x".into()).code(), "InvalidArgument");
        assert_eq!(Error::InvalidConfig("x".into()).code(), "InvalidConfig");

        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(err.code(), "InvalidUrl");
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidConfig("workers must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: workers must be at least 1"
        );
    }
}
