//! Tests for the wire types.

mod request_tests;
mod response_tests;
mod review_tests;
mod variables_tests;
