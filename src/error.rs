pub type RouenResult<T> = Result<T, RouenError>;

#[derive(thiserror::Error, Debug)]
pub enum RouenError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("uri error: {0}")]
    Uri(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("persistence error: {0}")]
    Persist(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RouenError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn uri(msg: impl Into<String>) -> Self {
        Self::Uri(msg.into())
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            RouenError::not_found("x")
                .to_string()
                .contains("not found:")
        );
        assert!(RouenError::uri("x").to_string().contains("uri error:"));
        assert!(
            RouenError::capture("x")
                .to_string()
                .contains("capture error:")
        );
        assert!(
            RouenError::persist("x")
                .to_string()
                .contains("persistence error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = RouenError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
