pub mod cache;
pub mod downloader;
pub mod error;
pub mod source;

pub use cache::BuildingCache;
pub use downloader::{BuildingDownloader, BuildingSource, DownloadProgress, DownloadState};
pub use error::{DownloadError, FetchError};
pub use source::{ContentSource, DirectoryContentSource, FetchedBuilding};
