//! Duplex message channel implementation (spec §6.1).
//!
//! Newline-delimited JSON over stdio, carrying the tagged-union
//! `Request`/`Response` messages defined in `types`.

pub mod stdio;
pub mod types;
