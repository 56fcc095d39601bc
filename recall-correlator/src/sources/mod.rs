pub mod enforcement_file;
pub mod feed_file;

pub use enforcement_file::EnforcementFileSource;
pub use feed_file::FeedFileSource;
