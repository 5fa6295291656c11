//! Client for the platform's REST command endpoint.
//!
//! Every operation is a TQL command posted as plain text; responses are a
//! JSON list of per-command results. Parsing of those results lives in
//! [`response`] as pure functions.

pub mod client;
pub mod error;
pub mod response;

pub use client::{StriimClient, Timeouts, TypeDrop};
pub use error::{ClientError, Result};
pub use response::CommandResult;
