use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("api key not found: set {0} or add GOOGLE_API_KEY to secrets.toml")]
    MissingApiKey(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DocchatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("generation.top_k = 0".into());
        assert_eq!(
            err.to_string(),
            "config validation error: generation.top_k = 0"
        );
    }

    #[test]
    fn missing_api_key_names_the_variable() {
        let err = ConfigError::MissingApiKey("GOOGLE_API_KEY".into());
        assert!(err.to_string().contains("set GOOGLE_API_KEY"));
        assert!(err.to_string().contains("secrets.toml"));
    }

    #[test]
    fn docchat_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: DocchatError = config_err.into();
        assert!(matches!(err, DocchatError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn docchat_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: DocchatError = io_err.into();
        assert!(matches!(err, DocchatError::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }
}
