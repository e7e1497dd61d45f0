// src/scanner.rs
//! Probe orchestration: drives every (class, method, parameter) work unit
//! through the mutator, transport and detectors, and merges the findings.

use crate::config::ScanConfig;
use crate::error::{ProbeError, TransportError};
use crate::http::HttpClient;
use crate::mutator::{InjectionMode, ParameterMutator};
use crate::payloads::PayloadCatalog;
use crate::sqli::SqlErrorDetector;
use crate::types::{
    HttpMethod, Parameter, ProbeRequest, ProbeResponse, ScanResult, ScanSummary, Vulnerability,
    VulnerabilityType,
};
use crate::xss::XssDetector;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// A vulnerability class and its probing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeClass {
    Sqli,
    Xss,
}

impl ProbeClass {
    fn vulnerability_type(self) -> VulnerabilityType {
        match self {
            ProbeClass::Sqli => VulnerabilityType::SqlInjection,
            ProbeClass::Xss => VulnerabilityType::ReflectedXss,
        }
    }

    fn injection_mode(self) -> InjectionMode {
        match self {
            ProbeClass::Sqli => InjectionMode::Append,
            ProbeClass::Xss => InjectionMode::Replace,
        }
    }

    /// A redirect body never carries the reflection XSS needs
    fn follows_redirects(self) -> bool {
        match self {
            ProbeClass::Sqli => true,
            ProbeClass::Xss => false,
        }
    }

    fn payloads(self, catalog: &PayloadCatalog) -> &[String] {
        match self {
            ProbeClass::Sqli => &catalog.sqli_payloads,
            ProbeClass::Xss => &catalog.xss_payloads,
        }
    }
}

impl fmt::Display for ProbeClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.vulnerability_type())
    }
}

#[derive(Debug, Default)]
struct ProbeCounters {
    sent: AtomicUsize,
    timed_out: AtomicBool,
}

/// The probe engine. Cheap to clone; clones share the HTTP connection pool
/// and the payload catalog.
#[derive(Clone)]
pub struct Scanner {
    config: Arc<ScanConfig>,
    client: HttpClient,
    catalog: Arc<PayloadCatalog>,
    sql_detector: Arc<SqlErrorDetector>,
    xss_detector: XssDetector,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self, ProbeError> {
        let catalog = config.load_catalog()?;
        Self::with_catalog(config, catalog)
    }

    pub fn with_catalog(config: ScanConfig, catalog: PayloadCatalog) -> Result<Self, ProbeError> {
        config.validate()?;
        let client = HttpClient::new(&config)?;
        let sql_detector = SqlErrorDetector::new(catalog.sql_error_signatures.as_slice());

        Ok(Self {
            config: Arc::new(config),
            client,
            catalog: Arc::new(catalog),
            sql_detector: Arc::new(sql_detector),
            xss_detector: XssDetector::new(),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Probe every query parameter of `target` for SQL injection and
    /// reflected XSS. Never fails: unreachable targets, unparseable URLs and
    /// parameterless URLs all produce an empty result.
    pub async fn scan(&self, target: &str) -> ScanResult {
        let scan_start = chrono::Utc::now();
        info!("Starting probe scan of {}", target);

        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(e) => {
                warn!("Target {} is not a valid URL: {}", target, e);
                return Self::build_result(target, scan_start, 0, &ProbeCounters::default(), Vec::new());
            }
        };

        let mutator = Arc::new(ParameterMutator::new(&url));
        let parameters = mutator.parameters();
        if parameters.is_empty() {
            info!("No query parameters in {}, nothing to probe", target);
            return Self::build_result(target, scan_start, 0, &ProbeCounters::default(), Vec::new());
        }

        info!("Found {} parameters to test", parameters.len());

        let endpoint = mutator.submission_endpoint();
        // unrepresentable deadlines mean no deadline
        let deadline = self
            .config
            .scan_timeout_secs
            .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)));
        let counters = Arc::new(ProbeCounters::default());
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = Vec::new();

        for class in self.enabled_classes() {
            info!("Queueing {} probes (GET + POST)", class);

            for method in [HttpMethod::GET, HttpMethod::POST] {
                for parameter in &parameters {
                    let scanner = self.clone();
                    let mutator = mutator.clone();
                    let endpoint = endpoint.clone();
                    let parameter = parameter.clone();
                    let counters = counters.clone();
                    let semaphore = semaphore.clone();
                    let label = format!("{} {} {}", class, method, parameter.name);

                    let task = tokio::spawn(async move {
                        let _permit = semaphore.acquire_owned().await.ok()?;
                        scanner
                            .probe_parameter(
                                &mutator, &endpoint, class, method, &parameter, deadline, &counters,
                            )
                            .await
                    });

                    tasks.push((label, task));
                }
            }
        }

        let vulnerabilities = collect_findings(tasks).await;
        let result = Self::build_result(target, scan_start, parameters.len(), &counters, vulnerabilities);

        if result.timed_out {
            warn!("Scan deadline reached, returning partial results");
        }
        info!(
            "Scan complete: {} findings from {} probes",
            result.total, result.probes_sent
        );

        result
    }

    fn enabled_classes(&self) -> Vec<ProbeClass> {
        let mut classes = Vec::with_capacity(2);
        if self.config.test_sqli {
            classes.push(ProbeClass::Sqli);
        }
        if self.config.test_xss {
            classes.push(ProbeClass::Xss);
        }
        classes
    }

    /// Try payloads in catalog order and stop at the first hit, so the
    /// reported payload is always the lowest-index one that detects.
    #[allow(clippy::too_many_arguments)]
    async fn probe_parameter(
        &self,
        mutator: &ParameterMutator,
        endpoint: &Url,
        class: ProbeClass,
        method: HttpMethod,
        parameter: &Parameter,
        deadline: Option<Instant>,
        counters: &ProbeCounters,
    ) -> Option<Vulnerability> {
        let payloads = class.payloads(&self.catalog);
        let budget = match method {
            HttpMethod::GET => payloads.len(),
            HttpMethod::POST => self.config.post_payload_budget.min(payloads.len()),
        };

        debug!(
            "Testing parameter '{}' for {} via {} ({} payloads)",
            parameter.name, class, method, budget
        );

        for payload in payloads.iter().take(budget) {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                counters.timed_out.store(true, Ordering::Relaxed);
                return None;
            }

            let request = match method {
                HttpMethod::GET => mutator.get_variant(
                    parameter,
                    payload,
                    class.injection_mode(),
                    class.follows_redirects(),
                ),
                HttpMethod::POST => {
                    mutator.post_variant(endpoint, parameter, payload, class.follows_redirects())
                }
            };

            counters.sent.fetch_add(1, Ordering::Relaxed);

            match self.dispatch(&request, deadline).await {
                Ok(response) => {
                    if let Some(vulnerability) = self.evaluate(class, &request, &response) {
                        warn!(
                            "{} [{}] in parameter '{}' via {} with payload {:?}",
                            vulnerability.vulnerability_type,
                            vulnerability.severity,
                            parameter.name,
                            method,
                            payload
                        );
                        return Some(vulnerability);
                    }
                }
                Err(TransportError::Cancelled) => {
                    counters.timed_out.store(true, Ordering::Relaxed);
                    return None;
                }
                Err(e) => {
                    debug!("Probe {} {} failed, treating as no detection: {}", method, request.url, e);
                }
            }
        }

        None
    }

    async fn dispatch(
        &self,
        request: &ProbeRequest,
        deadline: Option<Instant>,
    ) -> Result<ProbeResponse, TransportError> {
        match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, self.client.send(request))
                .await
                .unwrap_or(Err(TransportError::Cancelled)),
            None => self.client.send(request).await,
        }
    }

    /// Run the class's detector over one response.
    fn evaluate(
        &self,
        class: ProbeClass,
        request: &ProbeRequest,
        response: &ProbeResponse,
    ) -> Option<Vulnerability> {
        match class {
            ProbeClass::Sqli => {
                let signature = self.sql_detector.matched_signature(&response.body)?;
                Some(Vulnerability::from_probe(
                    request,
                    response,
                    VulnerabilityType::SqlInjection,
                    self.sql_detector.severity(),
                    signature.to_string(),
                ))
            }
            ProbeClass::Xss => {
                let reflection = self.xss_detector.detect(&response.body, &request.payload);
                let severity = self.xss_detector.severity(reflection, &request.payload)?;
                Some(Vulnerability::from_probe(
                    request,
                    response,
                    VulnerabilityType::ReflectedXss,
                    severity,
                    reflection.as_str().to_string(),
                ))
            }
        }
    }

    fn build_result(
        target: &str,
        scan_start: chrono::DateTime<chrono::Utc>,
        parameters_tested: usize,
        counters: &ProbeCounters,
        vulnerabilities: Vec<Vulnerability>,
    ) -> ScanResult {
        ScanResult {
            target: target.to_string(),
            scan_start: scan_start.to_rfc3339(),
            scan_end: chrono::Utc::now().to_rfc3339(),
            parameters_tested,
            probes_sent: counters.sent.load(Ordering::Relaxed),
            timed_out: counters.timed_out.load(Ordering::Relaxed),
            total: vulnerabilities.len(),
            summary: ScanSummary::from_findings(&vulnerabilities),
            vulnerabilities,
        }
    }
}

/// Await work units in queue order, which keeps the result list independent
/// of dispatch order. A unit that panicked or was aborted contributes nothing.
async fn collect_findings(
    tasks: Vec<(String, JoinHandle<Option<Vulnerability>>)>,
) -> Vec<Vulnerability> {
    let mut vulnerabilities = Vec::new();
    for (label, task) in tasks {
        match task.await {
            Ok(Some(vulnerability)) => vulnerabilities.push(vulnerability),
            Ok(None) => {}
            Err(e) => warn!("Probe task [{}] failed: {}", label, e),
        }
    }
    vulnerabilities
}
