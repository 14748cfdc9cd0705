//! Command handlers for the sng-inspect CLI
//!
//! Each handler runs one query against a [`Target`](sng_inspect::Target)
//! and renders the result; rendering lives in separate functions so it can
//! be tested without a target.

pub mod configure;
pub mod info;
pub mod pipes;
pub mod queue;
