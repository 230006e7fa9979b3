pub mod headers;
pub mod save;
pub mod session;

pub use save::{DiskSink, SaveSink};
pub use session::{DownloadPhase, DownloadSession, RetrievedFile};
