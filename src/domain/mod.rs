//! Plain data carried between the dispatch, stream and correlation stages.
mod stream;
mod work;

pub use stream::{InboundEnvelope, StreamDescriptor};
pub use work::WorkItem;
