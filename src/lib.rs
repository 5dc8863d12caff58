//! Core library for the `deploylat` CLI.
//!
//! The binary drives three stages that share one correlation store: a
//! dispatch loop firing templated trigger requests under a concurrency cap,
//! a fan-in of Service Bus confirmation streams, and a correlator that
//! classifies each confirmed operation as on-time or late. The stages are
//! exposed here so they can be driven with other trigger and stream
//! implementations; library APIs may evolve as the CLI grows.
pub mod args;
pub mod config;
pub mod correlation;
pub mod dispatch;
pub mod domain;
pub mod entry;
pub mod error;
pub mod http;
pub mod inputs;
pub mod metrics;
pub mod servicebus;
pub mod shutdown;
pub mod streams;
pub mod system;
