pub mod common;
pub mod download;
pub mod output;
pub mod upload;

/// Retention contract of the storage service, surfaced to users.
pub const RETENTION_HOURS: u64 = 24;
