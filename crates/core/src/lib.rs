//! Core library for maavara
//!
//! This crate implements the **Functional Core** of the maavara service:
//! pure transformation functions with zero I/O. The `maavara` binary crate
//! is the Imperative Shell that owns the HTTP boundary and the call to the
//! completion service.
//!
//! All functions here are deterministic, perform no side effects, and are
//! tested with simple fixture data (no mocking required):
//!
//! - [`clean`]: best-effort HTML stripping for free-text study fields
//! - [`prompt`]: the request model and the per-type prompt template table

pub mod clean;
pub mod prompt;
