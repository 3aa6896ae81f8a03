use thiserror::Error;

/// Input problems caught before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL must not be empty")]
    EmptyUrl,
    #[error("Keyword must not be empty")]
    EmptyKeyword,
    #[error("Domain must not be empty")]
    EmptyDomain,
    #[error("URL must start with http:// or https://")]
    InvalidScheme,
}
