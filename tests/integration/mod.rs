//! Integration test modules.

mod pipeline_test;
mod scheduler_test;
mod session_test;
