//! Integration-level unit tests for the nodeboot CLI library.
//!
//! These tests use faked ports and scratch directories; nothing touches the
//! real host or network.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod architecture;
mod bootstrap_flow;
mod property_tests;
