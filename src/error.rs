// src/error.rs
//! Error types for vulnprobe
//!
//! `ProbeError` covers everything that can stop a scan before it starts
//! (bad target, bad configuration, client construction). `TransportError`
//! is the failure half of a single probe and never aborts a scan.

use std::fmt;

/// Main error type for vulnprobe operations
#[derive(Debug)]
pub enum ProbeError {
    /// Target URL missing, malformed, or not http(s)
    InvalidTarget(String),

    /// Configuration validation error
    Config(String),

    /// HTTP client construction error
    Http(String),

    /// Parsing error (URL, YAML)
    Parse(String),

    /// I/O error (payload files)
    Io(std::io::Error),
}

impl std::error::Error for ProbeError {}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProbeError::InvalidTarget(s) => write!(f, "Invalid target: {}", s),
            ProbeError::Config(s) => write!(f, "Configuration error: {}", s),
            ProbeError::Http(s) => write!(f, "HTTP error: {}", s),
            ProbeError::Parse(s) => write!(f, "Parse error: {}", s),
            ProbeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(e: std::io::Error) -> Self {
        ProbeError::Io(e)
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        ProbeError::Http(e.to_string())
    }
}

impl From<url::ParseError> for ProbeError {
    fn from(e: url::ParseError) -> Self {
        ProbeError::Parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for ProbeError {
    fn from(e: serde_yaml::Error) -> Self {
        ProbeError::Parse(format!("YAML parse error: {}", e))
    }
}

/// Failure of a single probe. The orchestrator records it as a non-detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Per-probe timeout elapsed
    Timeout(String),

    /// DNS failure, refused connection, TLS handshake failure
    Connect(String),

    /// Any other request failure (redirect loop, invalid request)
    Request(String),

    /// Response arrived but the body could not be read
    Body(String),

    /// Scan deadline reached before the probe completed
    Cancelled,
}

impl std::error::Error for TransportError {}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransportError::Timeout(s) => write!(f, "Probe timed out: {}", s),
            TransportError::Connect(s) => write!(f, "Connection error: {}", s),
            TransportError::Request(s) => write!(f, "Request error: {}", s),
            TransportError::Body(s) => write!(f, "Body read error: {}", s),
            TransportError::Cancelled => write!(f, "Probe cancelled: scan deadline reached"),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            TransportError::Body(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_target_error() {
        let error = ProbeError::InvalidTarget("missing scheme".to_string());
        assert_eq!(error.to_string(), "Invalid target: missing scheme");
    }

    #[test]
    fn test_config_error() {
        let error = ProbeError::Config("Invalid timeout value".to_string());
        assert_eq!(error.to_string(), "Configuration error: Invalid timeout value");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let probe_error: ProbeError = io_error.into();
        assert!(matches!(probe_error, ProbeError::Io(_)));
        assert!(probe_error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let parse_error = url::Url::parse("not a valid url").unwrap_err();
        let probe_error: ProbeError = parse_error.into();
        assert!(matches!(probe_error, ProbeError::Parse(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<Vec<String>>("{ not: [a list").unwrap_err();
        let probe_error: ProbeError = yaml_error.into();
        assert!(probe_error.to_string().starts_with("Parse error: YAML parse error"));
    }

    #[test]
    fn test_transport_error_display() {
        let errors = vec![
            TransportError::Timeout("10s".to_string()),
            TransportError::Connect("refused".to_string()),
            TransportError::Request("redirect loop".to_string()),
            TransportError::Body("truncated".to_string()),
            TransportError::Cancelled,
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn test_error_trait_implemented() {
        let error = ProbeError::Config("Test".to_string());
        let _: &dyn std::error::Error = &error;
        let _: &dyn std::error::Error = &TransportError::Cancelled;
    }
}
