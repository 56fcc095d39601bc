pub mod defs;
pub mod window;

pub use defs::*;
pub use window::TimeWindow;
