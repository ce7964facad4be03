//! Request middleware.
//!
//! Currently a single layer: [`Trace`] assigns every request a trace id and
//! echoes it back in the `trace-id` response header.

pub mod trace;

pub use trace::Trace;
