//! CSV Adapters - Seller Export Ingest and Report Export
//!
//! The file-format boundary of the dashboard. Ingest validates column
//! presence and hands typed (leniently parsed) records to the core;
//! export serializes the unified collection for spreadsheets.

pub mod export;
pub mod ingest;

pub use export::{export_report, report_filename};
pub use ingest::{parse_info, parse_inventory, parse_pricing, IngestError};
