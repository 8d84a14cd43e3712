// tests/integration/mod.rs
//! Integration tests for notion-source
//!
//! These tests run complete reads through `NotionSource` against an
//! in-memory `NotionRepository`, and parse recorded API responses through
//! the same code paths the HTTP client uses.

#[cfg(test)]
mod common;


#[cfg(test)]
mod concurrency;

#[cfg(test)]
mod page_detail;

#[cfg(test)]
mod fixture_parsing;

#[cfg(test)]
mod decoder_round_trip;
