use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntrospectionError>;

#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("Failed to parse introspection response: {0}")]
    Parse(String),

    #[error("Invalid introspection response: {0}")]
    Invalid(String),

    /// The endpoint answered with a top-level `error` string instead of data.
    #[error("API error: {0}")]
    Api(String),

    /// The endpoint answered with a GraphQL `errors` array.
    #[error("GraphQL errors: {0}")]
    GraphQL(String),
}

impl IntrospectionError {
    /// Returns true if the endpoint rejected the requested API version.
    #[must_use]
    pub fn is_invalid_version(&self) -> bool {
        match self {
            Self::Api(message) => message == "Invalid API version",
            Self::Http(_, body) => body.contains("Invalid API version"),
            _ => false,
        }
    }
}
