// xss.rs - Reflected XSS detection
use crate::types::Severity;
use serde::{Deserialize, Serialize};

/// Payload fragments that execute as-is when reflected unescaped
const EXECUTION_MARKERS: &[&str] = &["<script>", "onerror=", "onload="];

/// How (and whether) a payload came back in the response body
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Reflection {
    None,
    /// Payload echoed byte-for-byte
    Raw,
    /// Payload echoed HTML-entity escaped
    Encoded,
}

impl Reflection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reflection::None => "none",
            Reflection::Raw => "raw",
            Reflection::Encoded => "encoded",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XssDetector;

impl XssDetector {
    pub fn new() -> Self {
        Self
    }

    /// Raw match is checked before the escaped forms.
    pub fn detect(&self, body: &str, payload: &str) -> Reflection {
        if body.contains(payload) {
            return Reflection::Raw;
        }

        if escaped_forms(payload).iter().any(|form| body.contains(form.as_str())) {
            return Reflection::Encoded;
        }

        Reflection::None
    }

    /// `None` means no finding is recorded.
    pub fn severity(&self, reflection: Reflection, payload: &str) -> Option<Severity> {
        match reflection {
            Reflection::Raw if has_execution_marker(payload) => Some(Severity::High),
            Reflection::Raw => Some(Severity::Medium),
            Reflection::Encoded => Some(Severity::Medium),
            Reflection::None => None,
        }
    }
}

/// Script tag or event-handler attribute present in the payload
pub fn has_execution_marker(payload: &str) -> bool {
    let lowered = payload.to_lowercase();
    EXECUTION_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Escaped renderings a server commonly produces: full (`& < > " '`) and
/// text-only (`& < >`). Payloads with nothing to escape yield no forms.
fn escaped_forms(payload: &str) -> Vec<String> {
    let mut forms: Vec<String> = Vec::with_capacity(2);

    for form in [
        html_escape::encode_quoted_attribute(payload),
        html_escape::encode_text(payload),
    ] {
        if form != payload && !forms.iter().any(|existing| *existing == form) {
            forms.push(form.into_owned());
        }
    }

    forms
}
