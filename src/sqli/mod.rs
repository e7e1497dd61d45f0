// src/sqli/mod.rs
// SQL injection detection for the probe engine

pub mod detector;

pub use detector::SqlErrorDetector;
