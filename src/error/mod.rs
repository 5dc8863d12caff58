mod app;
mod config;
mod decode;
mod input;
mod outcome;
mod stream;
mod trigger;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use decode::DecodeError;
pub use input::InputError;
pub use outcome::OutcomeError;
pub use stream::StreamError;
pub use trigger::TriggerError;
pub use validation::ValidationError;
