mod cursor;
mod jitter;
mod rate;
mod runner;
mod trigger;


pub use cursor::WorkCursor;
pub use jitter::JitterRange;
pub use rate::build_launch_limiter;
pub use runner::{DispatchConfig, DispatchLoop};
pub use trigger::Trigger;
