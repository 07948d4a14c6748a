//! Shared plumbing for the OpenMash calendar adapter.
//!
//! The only thing every crate in the workspace needs is a consistent way to
//! set up logging, which lives in [`tracing`].

pub mod tracing;

pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
