pub mod config;
pub mod errors;
pub mod format;
pub mod links;

pub use config::{load_config, DropConfig};
pub use errors::TransferError;
pub use format::format_size;
