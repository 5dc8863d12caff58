mod fanin;
mod source;


pub use fanin::{FanIn, FanInConfig, spawn_fan_in};
pub use source::{ReceivedMessage, StreamSource, Subscription};
