pub mod logger;
pub mod shutdown_handlers;
pub mod summary_output;

pub use summary_output::summary_lines;
