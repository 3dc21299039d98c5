//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` and hosts the
//! infrastructure the core stays ignorant of (file formats, HTTP,
//! metrics, snapshots). Each sub-module groups adapters by concern.
//!
//! Adapter categories:
//! - `csv`: seller export ingest and report export
//! - `persistence`: override/settings JSON snapshots
//! - `ai`: external text-generation client (Analyst port)
//! - `http`: axum API surface
//! - `metrics`: Prometheus export

pub mod ai;
pub mod csv;
pub mod http;
pub mod metrics;
pub mod persistence;
