// tests/mod.rs
//! Test suite organization for notion-source
//!
//! Unit tests live next to the code they cover; this crate holds the
//! integration tests that drive a whole read against a scripted repository
//! and the recorded API fixtures under `fixtures/`.

#[cfg(test)]
pub mod integration;
