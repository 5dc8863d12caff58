//! Startup inputs: the work set and the list of inbound streams.
mod streams;
mod work_items;


pub use streams::{load_stream_descriptors, parse_stream_descriptors};
pub use work_items::{load_work_items, parse_work_items};
