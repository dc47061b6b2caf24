//! Integration test crate for the Cutline engine.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the core, timeline and session crates to verify they
//! work together.

#[cfg(test)]
mod engine;
