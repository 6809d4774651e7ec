//! Integration tests for the demoenv CLI
//!
//! These tests spawn the actual binary and check argument handling, output
//! formats and exit codes. None of them reach a real platform: every case
//! fails validation or configuration before the first network call.

mod cli_tests;
mod json_output;
