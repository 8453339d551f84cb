//! API middleware stack.

pub mod request_log;
