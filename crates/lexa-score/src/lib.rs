//! Best-effort client for the remote document scoring endpoint.
//!
//! # Architecture
//!
//! - [`options`] - Endpoint, timeout and client identity
//! - [`parse`] - Pure extraction of the score from a response body
//! - [`transport`] - HTTP abstraction with a `reqwest` implementation
//! - [`client`] - Request assembly and failure containment
//!
//! A missing score is an expected outcome: [`ScoringClient::score`] never
//! fails, it logs the cause and returns `None`.

pub mod client;
mod error;
pub mod options;
pub mod parse;
pub mod transport;

pub use client::{ScoringClient, form_body};
pub use error::ScoreError;
pub use options::ScoringOptions;
pub use parse::parse_prediction;
pub use transport::Transport;

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
