use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Where a parameter was found in the scan target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParameterOrigin {
    QueryString,
    FormBody,
}

/// A parameter that can be tested
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// First value seen for this name
    pub original_value: String,
    pub origin: ParameterOrigin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HttpMethod::GET => write!(f, "GET"),
            HttpMethod::POST => write!(f, "POST"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VulnerabilityType {
    #[serde(rename = "SQL Injection")]
    SqlInjection,
    #[serde(rename = "Reflected XSS")]
    ReflectedXss,
}

impl fmt::Display for VulnerabilityType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VulnerabilityType::SqlInjection => write!(f, "SQL Injection"),
            VulnerabilityType::ReflectedXss => write!(f, "Reflected XSS"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
        }
    }
}

/// A fully determined request variant. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub parameter: String,
    pub payload: String,
    pub method: HttpMethod,
    pub url: Url,
    /// Form fields for POST probes
    pub form: Option<Vec<(String, String)>>,
    pub follow_redirects: bool,
}

impl ProbeRequest {
    /// Form body as it goes on the wire
    pub fn encoded_body(&self) -> Option<String> {
        self.form.as_ref().map(|fields| {
            url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields.iter())
                .finish()
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// A confirmed finding. Created by the scanner on a positive detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vulnerability {
    #[serde(rename = "type")]
    pub vulnerability_type: VulnerabilityType,
    pub parameter: String,
    pub severity: Severity,
    pub payload: String,
    /// Test URL for GET probes, submission endpoint for POST probes
    pub url: String,
    /// Form-encoded body for POST probes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub method: HttpMethod,
    pub status_code: u16,
    /// Matched error signature, or the reflection kind for XSS
    pub evidence: String,
}

impl Vulnerability {
    pub fn from_probe(
        request: &ProbeRequest,
        response: &ProbeResponse,
        vulnerability_type: VulnerabilityType,
        severity: Severity,
        evidence: String,
    ) -> Self {
        Self {
            vulnerability_type,
            parameter: request.parameter.clone(),
            severity,
            payload: request.payload.clone(),
            url: request.url.to_string(),
            body: request.encoded_body(),
            method: request.method,
            status_code: response.status_code,
            evidence,
        }
    }
}

/// Complete scan results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub target: String,
    pub scan_start: String,
    pub scan_end: String,
    pub parameters_tested: usize,
    pub probes_sent: usize,
    pub timed_out: bool,
    pub total: usize,
    pub vulnerabilities: Vec<Vulnerability>,
    pub summary: ScanSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub sql_injection: usize,
    pub reflected_xss: usize,
}

impl ScanSummary {
    pub fn from_findings(vulnerabilities: &[Vulnerability]) -> Self {
        let count_severity =
            |severity: Severity| vulnerabilities.iter().filter(|v| v.severity == severity).count();
        let count_type = |kind: VulnerabilityType| {
            vulnerabilities
                .iter()
                .filter(|v| v.vulnerability_type == kind)
                .count()
        };

        Self {
            high: count_severity(Severity::High),
            medium: count_severity(Severity::Medium),
            low: count_severity(Severity::Low),
            sql_injection: count_type(VulnerabilityType::SqlInjection),
            reflected_xss: count_type(VulnerabilityType::ReflectedXss),
        }
    }
}
