//! Integration scenarios for the tab group engine

mod session_tests;
mod telemetry_tests;
