//! # Recipe Core
//!
//! The domain layer of Recipe Plus.
//! Entities, domain errors and the ports the hosted backend must implement.
//! Nothing in here knows which backend is on the other side of a port.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
