//! Integration tests for the HTTP surface and the broadcast path.

mod api_test;
mod broadcast_test;
mod helpers;
