//! Trait definitions for scaleplan.
//!
//! The workflow crate talks to the completion service only through
//! [`CompletionDriver`], so tests can substitute scripted drivers.

mod traits;

pub use traits::CompletionDriver;
