//! FlowFi Events - real-time stream notifications over Server-Sent Events
//!
//! Clients subscribe to payment-stream ids and account keys; indexed chain
//! events are fanned out to every matching live connection.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
