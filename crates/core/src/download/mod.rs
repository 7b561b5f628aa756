//! Download backend abstraction.

mod transmission;
mod types;

pub use transmission::TransmissionClient;
pub use types::{AddedDownload, DownloadCategory, DownloadClient, DownloadError};
