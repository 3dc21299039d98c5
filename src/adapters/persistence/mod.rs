//! Persistence Adapters - Override and Settings Snapshots
//!
//! No database: the dashboard's durable state is two small JSON
//! files written atomically (tmp → rename) in the data directory.
//! `MemoryOverrideStore` is the live implementation of the
//! `OverrideStore` port; the snapshot stores hydrate it at startup
//! and capture it on change and at shutdown.

pub mod overrides;
pub mod settings;

pub use overrides::{MemoryOverrideStore, OverrideSnapshotStore};
pub use settings::SettingsStore;
