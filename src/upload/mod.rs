pub mod progress;
pub mod session;

pub use progress::ProgressCounter;
pub use session::{FileDescriptor, TransferResult, UploadPhase, UploadSession};
