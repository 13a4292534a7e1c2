//! Core library surface for the theatre troupe ledger.
//!
//! The persistence layer (`db`) owns the SQLite schema and every query, the
//! `report` module turns a loaded snapshot into plain tables, and `export`
//! renders those tables as PDF or XLSX documents. The `bin` target is a thin
//! command-line wrapper over these pieces.
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod report;
pub mod validate;

pub use config::{Config, DatabaseLocation};
pub use error::{Error, Result};

pub use export::{default_destination, export, export_with, ExportFormat, ExportOptions, PdfFont};
pub use report::{build_report, build_section_report, Report, ReportKind, Section};
