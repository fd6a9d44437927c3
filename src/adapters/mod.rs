//! Adapters Layer
//!
//! `inbound` drives the application (HTTP API); `outbound` implements the
//! domain ports against third-party geolocation APIs.

pub mod inbound;
pub mod outbound;
