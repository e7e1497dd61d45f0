use crate::types::Severity;

/// Error-based SQL injection detection.
///
/// A probe is positive when the response leaks a database error string.
/// Matching is a case-insensitive substring search over the signature list,
/// first match wins.
#[derive(Debug, Clone)]
pub struct SqlErrorDetector {
    /// Lowercased signatures paired with their original spelling
    signatures: Vec<(String, String)>,
}

impl SqlErrorDetector {
    pub fn new<S: AsRef<str>>(signatures: &[S]) -> Self {
        Self {
            signatures: signatures
                .iter()
                .map(|s| (s.as_ref().to_lowercase(), s.as_ref().to_string()))
                .collect(),
        }
    }

    pub fn detect(&self, body: &str) -> bool {
        self.matched_signature(body).is_some()
    }

    /// First signature (catalog order) found in the body
    pub fn matched_signature(&self, body: &str) -> Option<&str> {
        let body = body.to_lowercase();

        self.signatures
            .iter()
            .find(|(lowered, _)| body.contains(lowered.as_str()))
            .map(|(_, original)| original.as_str())
    }

    /// Any surfaced backend error counts as high confidence
    pub fn severity(&self) -> Severity {
        Severity::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payloads::SQL_ERROR_SIGNATURES;

    fn detector() -> SqlErrorDetector {
        SqlErrorDetector::new(SQL_ERROR_SIGNATURES)
    }

    #[test]
    fn test_error_detection() {
        let body_with_error = "MySQL error: You have an error in your SQL syntax near ''1''";
        assert!(detector().detect(body_with_error));

        let body_normal = "Welcome to our website";
        assert!(!detector().detect(body_normal));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(detector().detect("<b>WARNING: MYSQL_FETCH_ARRAY() expects parameter 1</b>"));
        assert!(detector().detect("pg: postgresql error: relation does not exist"));
    }

    #[test]
    fn test_vendor_signatures() {
        let bodies = [
            ("ORA-00933: SQL command not properly ended", "ORA-00933"),
            ("Microsoft OLE DB Provider for ODBC Drivers error '80040e14'", "Microsoft OLE DB Provider"),
            ("Unclosed quotation mark after the character string ''.", "Unclosed quotation mark"),
            ("SQLite3::query(): Unable to prepare statement", "SQLite3::"),
            ("org.postgresql.util.PSQLException: ERROR", "SQLException"),
        ];

        for (body, expected) in bodies {
            assert_eq!(detector().matched_signature(body), Some(expected), "{}", body);
        }
    }

    #[test]
    fn test_first_signature_wins() {
        // "SQL syntax" precedes "you have an error in your sql syntax" in the catalog
        let body = "You have an error in your SQL syntax";
        assert_eq!(detector().matched_signature(body), Some("SQL syntax"));
    }

    #[test]
    fn test_always_high() {
        assert_eq!(detector().severity(), Severity::High);
    }

    #[test]
    fn test_custom_signatures() {
        let custom = SqlErrorDetector::new(&["DB2 SQL error".to_string()]);
        assert!(custom.detect("db2 sql error: SQLCODE=-104"));
        assert!(!custom.detect("You have an error in your SQL syntax"));
    }
}
