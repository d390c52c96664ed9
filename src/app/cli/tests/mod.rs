//! Tests for argument parsing and listings

mod display_tests;
