//! Report assembly.
//!
//! [`ReportAssembler`] merges the output of every analyzer into a single
//! [`ReportBundle`] that serializes to JSON for display or export.
//!
//! # Example
//!
//! ```rust,ignore
//! use dqc::reporting::{ReportAssembler, ReportInputs};
//!
//! let bundle = ReportAssembler::build_report_bundle(inputs);
//! println!("{}", ReportAssembler::to_json_pretty(&bundle)?);
//! ReportAssembler::write_report_to_file(&bundle, Path::new("report.json"))?;
//! ```

mod generator;

pub use generator::{
    DriftSection, OutlierSection, ReportAssembler, ReportBundle, ReportInputs, ReportMeta,
};
