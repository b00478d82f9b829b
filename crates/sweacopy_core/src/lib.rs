//! Copies a SWEA submission's memory and runtime as a doc comment.
//!
//! The current history page is scanned for the requested submitter first;
//! on a miss every history page is requested in order until a row matches.

pub mod clipboard;
pub mod config;
pub mod copy;
pub mod extract;
pub mod format;
pub mod locate;
pub mod net;
pub mod page;
pub mod runtime;
pub mod search;
pub mod store;
pub mod text;
pub mod trigger;

#[cfg(test)]
mod test_support;
