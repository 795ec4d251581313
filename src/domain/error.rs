use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown locale `{value}`")]
    UnknownLocale { value: String },
    #[error("repository `{value}` is not of the form `owner/name`")]
    InvalidRepository { value: String },
}

impl DomainError {
    pub fn unknown_locale(value: impl Into<String>) -> Self {
        Self::UnknownLocale {
            value: value.into(),
        }
    }

    pub fn invalid_repository(value: impl Into<String>) -> Self {
        Self::InvalidRepository {
            value: value.into(),
        }
    }
}
