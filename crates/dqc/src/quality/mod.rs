//! Row- and value-level quality checks.
//!
//! This module provides duplicate row detection and regex-based scanning of
//! text columns for personally identifiable information.

mod duplicates;
mod pii;

pub use duplicates::{DuplicateDetector, MAX_DUPLICATE_EXAMPLES};
pub use pii::{PiiKind, PiiScanner};
