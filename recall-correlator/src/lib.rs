pub mod types;
pub mod utils;
pub mod severity;
pub mod timeline;
pub mod signals;
pub mod matcher;
pub mod ranking;
pub mod correlator;
pub mod enforcement;
pub mod parser;
pub mod traits;
pub mod sources;
pub mod display;

pub use types::*;
pub use timeline::TimelineBuilder;
pub use matcher::{Matcher, PairScore};
pub use correlator::{CorrelationReport, Correlator};
pub use parser::FeedParser;
pub use traits::RecordSource;
pub use sources::{EnforcementFileSource, FeedFileSource};
