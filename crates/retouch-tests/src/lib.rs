//! Integration tests for retouch-rs crates.
//!
//! End-to-end checks across curve editing, LUT building and pixel mapping.
