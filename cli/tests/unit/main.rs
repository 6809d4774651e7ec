//! Unit tests for the demoenv CLI
//!
//! These tests drive the sagas against an in-memory platform and run fast
//! without external I/O.

mod architecture;
mod fakes;
