// src/lib.rs
//! vulnprobe: probes the query parameters of a single URL for SQL injection
//! (leaked database errors) and reflected XSS (echoed payloads).
//!
//! ```no_run
//! # async fn run() -> Result<(), vulnprobe::ProbeError> {
//! use vulnprobe::{validate_target, ScanConfig, Scanner};
//!
//! let target = validate_target("http://testphp.vulnweb.com/artists.php?artist=1")?;
//! let scanner = Scanner::new(ScanConfig::default())?;
//! let result = scanner.scan(target.as_str()).await;
//! println!("{} findings", result.total);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod mutator;
pub mod payloads;
pub mod scanner;
pub mod sqli;
pub mod types;
pub mod xss;

pub use config::{validate_target, ScanConfig};
pub use error::{ProbeError, TransportError};
pub use payloads::PayloadCatalog;
pub use scanner::Scanner;
pub use types::{
    HttpMethod, Parameter, ParameterOrigin, ScanResult, ScanSummary, Severity, Vulnerability,
    VulnerabilityType,
};
