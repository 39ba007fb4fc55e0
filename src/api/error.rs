/// Failures of the REST side of a poll. Any of these aborts the fetch
/// sequence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{0} Unauthorized")]
    Authentication(u16),

    #[error("{0} Forbidden")]
    Authorization(u16),

    #[error("{0} Undecoded status code")]
    Protocol(u16),

    #[error("invalid Content-Range header: {0}")]
    ContentRange(String),

    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("cannot decode response body: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Map a non-success HTTP status to the matching error kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiError::Authentication(status),
            403 => ApiError::Authorization(status),
            _   => ApiError::Protocol(status),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::from_status(401), ApiError::Authentication(401));
        assert_eq!(ApiError::from_status(403), ApiError::Authorization(403));
        assert_eq!(ApiError::from_status(500), ApiError::Protocol(500));
        assert_eq!(ApiError::from_status(404).to_string(), "404 Undecoded status code");
    }
}
