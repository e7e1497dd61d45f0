// src/config.rs
use crate::error::ProbeError;
use crate::payloads::PayloadCatalog;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Upper bound on the overall scan deadline (24h)
pub const MAX_SCAN_TIMEOUT_SECS: u64 = 86_400;

/// Configuration for the probe engine
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Per-probe timeout
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Worker pool size; 1 gives fully sequential probing
    pub max_concurrency: usize,
    /// Number of leading catalog payloads tried in the POST pass
    pub post_payload_budget: usize,
    /// Overall scan deadline
    pub scan_timeout_secs: Option<u64>,
    pub test_sqli: bool,
    pub test_xss: bool,
    pub payload_file: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrency: 5,
            post_payload_budget: 5,
            scan_timeout_secs: None,
            test_sqli: true,
            test_xss: true,
            payload_file: None,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ProbeError::Config(
                "Probe timeout must be between 1 and 120 seconds".to_string(),
            ));
        }

        if self.max_concurrency == 0 || self.max_concurrency > 20 {
            return Err(ProbeError::Config(
                "Max concurrency must be between 1 and 20".to_string(),
            ));
        }

        if self.post_payload_budget == 0 {
            return Err(ProbeError::Config(
                "POST payload budget must be at least 1".to_string(),
            ));
        }

        if let Some(secs) = self.scan_timeout_secs {
            if secs == 0 || secs > MAX_SCAN_TIMEOUT_SECS {
                return Err(ProbeError::Config(format!(
                    "Scan timeout must be between 1 and {} seconds",
                    MAX_SCAN_TIMEOUT_SECS
                )));
            }
        }

        if self.user_agent.trim().is_empty() {
            return Err(ProbeError::Config("User-Agent must not be empty".to_string()));
        }

        if !self.test_sqli && !self.test_xss {
            return Err(ProbeError::Config(
                "At least one of SQL injection or XSS testing must be enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Built-in catalog unless a payload file is configured
    pub fn load_catalog(&self) -> Result<PayloadCatalog, ProbeError> {
        match &self.payload_file {
            Some(path) => PayloadCatalog::from_yaml_file(path),
            None => Ok(PayloadCatalog::builtin().clone()),
        }
    }
}

/// Reject targets the engine should never be handed: unparseable URLs and
/// anything that is not http(s).
pub fn validate_target(target: &str) -> Result<Url, ProbeError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(ProbeError::InvalidTarget("URL cannot be empty".to_string()));
    }

    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ProbeError::InvalidTarget(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ProbeError::InvalidTarget(format!("{}: {}", trimmed, e)))?;

    if url.host_str().is_none() {
        return Err(ProbeError::InvalidTarget(format!("{}: missing host", trimmed)));
    }

    Ok(url)
}
