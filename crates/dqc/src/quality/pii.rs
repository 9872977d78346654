//! Pattern-based PII detection in text columns.
//!
//! Only regular expressions are used. The phone pattern is deliberately loose
//! and matches many 7 to 11 digit runs that are not phone numbers.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::table::Table;
use crate::types::PiiFinding;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid regex: email")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?:\+?1\s*[-.]?\s*)?(?:\(?\d{3}\)?\s*[-.]?\s*)?\d{3}\s*[-.]?\s*\d{4})")
        .expect("Invalid regex: phone")
});

static SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("Invalid regex: SSN"));

static CREDIT_CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d[ -]*?){13,16}\b").expect("Invalid regex: credit card"));

/// Kinds of entity the scanner looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiKind {
    Email,
    Phone,
    Ssn,
    CreditCard,
}

impl PiiKind {
    pub const ALL: [PiiKind; 4] = [
        PiiKind::Email,
        PiiKind::Phone,
        PiiKind::Ssn,
        PiiKind::CreditCard,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            PiiKind::Email => &EMAIL_RE,
            PiiKind::Phone => &PHONE_RE,
            PiiKind::Ssn => &SSN_RE,
            PiiKind::CreditCard => &CREDIT_CARD_RE,
        }
    }

    /// Whether the value contains this kind of entity anywhere.
    pub fn matches(&self, value: &str) -> bool {
        self.pattern().is_match(value)
    }
}

/// Scans text columns for personally identifiable information.
pub struct PiiScanner;

impl PiiScanner {
    /// Count, per text column, the values containing each entity kind.
    ///
    /// Columns without any hit are left out, so a clean table yields an empty
    /// list.
    pub fn pii_scan(table: &Table) -> Result<Vec<PiiFinding>> {
        let mut findings = Vec::new();

        for info in table.text_columns() {
            let finding = Self::scan_column(&info.name, table.text_values(&info.name)?);
            if finding.total_hits() > 0 {
                findings.push(finding);
            }
        }

        debug!("PII scan found hits in {} columns", findings.len());
        Ok(findings)
    }

    fn scan_column(name: &str, values: Vec<Option<String>>) -> PiiFinding {
        let mut finding = PiiFinding {
            column: name.to_string(),
            email_hits: 0,
            phone_hits: 0,
            ssn_hits: 0,
            credit_card_hits: 0,
        };

        for value in values.iter().flatten() {
            for kind in PiiKind::ALL {
                if kind.matches(value) {
                    let counter = match kind {
                        PiiKind::Email => &mut finding.email_hits,
                        PiiKind::Phone => &mut finding.phone_hits,
                        PiiKind::Ssn => &mut finding.ssn_hits,
                        PiiKind::CreditCard => &mut finding.credit_card_hits,
                    };
                    *counter += 1;
                }
            }
        }

        finding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    // ==================== pattern tests ====================

    #[test]
    fn test_email_pattern() {
        assert!(PiiKind::Email.matches("contact: jane.doe+x@example.co.uk"));
        assert!(!PiiKind::Email.matches("jane@localhost"));
        assert!(!PiiKind::Email.matches("a@b.c"));
    }

    #[test]
    fn test_ssn_pattern() {
        assert!(PiiKind::Ssn.matches("111-22-3333"));
        assert!(!PiiKind::Ssn.matches("111223333"));
        assert!(!PiiKind::Ssn.matches("1111-22-3333"));
    }

    #[test]
    fn test_phone_pattern() {
        assert!(PiiKind::Phone.matches("(555) 123-4567"));
        assert!(PiiKind::Phone.matches("+1 555.123.4567"));
        assert!(PiiKind::Phone.matches("call 5551234"));
        assert!(!PiiKind::Phone.matches("111-22-3333"));
        assert!(!PiiKind::Phone.matches("hello"));
    }

    #[test]
    fn test_credit_card_pattern() {
        assert!(PiiKind::CreditCard.matches("4111 1111 1111 1111"));
        assert!(PiiKind::CreditCard.matches("4111-1111-1111-1111"));
        assert!(PiiKind::CreditCard.matches("4111111111111111"));
        assert!(!PiiKind::CreditCard.matches("4111 1111"));
    }

    // ==================== pii_scan tests ====================

    #[test]
    fn test_pii_scan_mixed_column() {
        let table = Table::new(df!["contact" => ["a@b.com", "hello", "111-22-3333"]].unwrap());
        let findings = PiiScanner::pii_scan(&table).unwrap();

        assert_eq!(
            findings,
            vec![PiiFinding {
                column: "contact".to_string(),
                email_hits: 1,
                phone_hits: 0,
                ssn_hits: 1,
                credit_card_hits: 0,
            }]
        );
    }

    #[test]
    fn test_pii_scan_skips_clean_and_numeric_columns() {
        let table = Table::new(
            df![
                "note" => ["hello", "world"],
                "phone_like_number" => [5551234567i64, 5559876543],
            ]
            .unwrap(),
        );
        assert!(PiiScanner::pii_scan(&table).unwrap().is_empty());
    }

    #[test]
    fn test_pii_scan_reads_categorical_columns() {
        let contact = Series::new("contact".into(), ["a@b.com", "hello", "a@b.com"])
            .cast(&DataType::from_categories(Categories::global()))
            .unwrap();
        let table = Table::new(DataFrame::new(vec![contact.into_column()]).unwrap());
        assert_eq!(table.columns()[0].kind, crate::utils::ColumnKind::Text);

        let findings = PiiScanner::pii_scan(&table).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].email_hits, 2);
    }

    #[test]
    fn test_pii_scan_ignores_missing_values() {
        let table = Table::new(df!["email" => [Some("x@y.org"), None, Some("z@w.io")]].unwrap());
        let findings = PiiScanner::pii_scan(&table).unwrap();
        assert_eq!(findings[0].email_hits, 2);
    }

    #[test]
    fn test_pii_scan_counts_values_not_matches() {
        let table = Table::new(df!["emails" => ["a@b.com c@d.com"]].unwrap());
        let findings = PiiScanner::pii_scan(&table).unwrap();
        assert_eq!(findings[0].email_hits, 1);
    }
}
