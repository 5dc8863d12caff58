//! Azure Service Bus topics as confirmation streams, over the REST API.
//!
//! Every stream descriptor names a topic and the namespace connection string.
//! Opening a stream creates a private subscription on that topic, messages
//! are received in peek-lock mode and completed once forwarded, and the
//! subscription is deleted again when the stream is closed.

mod client;
mod connection;
mod sas;


pub use client::{ServiceBusConfig, ServiceBusSource, ServiceBusSubscription};
pub use connection::ConnectionString;
pub use sas::{SasTokenCache, sign_sas_token};
