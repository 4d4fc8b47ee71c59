//! Integration tests for the builder, run against the fake engine and
//! converter in `tests/fixtures`. `installed_tools_tests` uses the real tools.

#![cfg(unix)]

mod common;

mod file_source_tests;
mod setup_tests;
mod text_source_tests;
