//! # kiln-view — Content and viewport core for kiln
//!
//! This crate holds what the screen shows and how it is laid out:
//!
//! - **[`lines`]** — `LineStore`, the file's lines in order, newline-stripped
//! - **[`viewport`]** — cursor, scroll offset, and screen dimensions
//! - **[`render`]** — composes one frame into an `OutputBuffer`
//! - **[`error`]** — file loading failures
//!
//! Terminal I/O lives in `kiln-term`; this crate only produces bytes.

pub mod error;
pub mod lines;
pub mod render;
pub mod viewport;

pub use error::LoadError;
