//! The read and write paths shared by every entry point.
//!
//! Both paths classify the context once and dispatch on the resulting
//! [`ContextKind`](crate::context::ContextKind). Guards and value coercion
//! happen in the entry points before these functions are reached.

pub(crate) mod read;
pub(crate) mod write;
