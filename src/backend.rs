//! Submission data representations and interactions with the hosted database.
//!
//! The [gateway::Gateway] is the entry point: it validates input, calls the
//! raw REST actions in [api], and translates their failures into
//! [error::SubmissionError].

pub mod api;
pub(crate) mod commands;
pub mod error;
pub mod export;
pub mod gateway;
pub mod models;
pub mod notify;
