//! The download pipeline: orchestrator → channel processor → media fetcher,
//! with statistics flowing back up.

pub mod fetch;
pub mod orchestrator;
pub mod processor;
pub mod stats;

pub use fetch::{FetchOutcome, MediaFetcher};
pub use orchestrator::MediaArchiver;
pub use processor::ChannelProcessor;
pub use stats::{ChannelStats, DownloadSession, MediaRecord};
