//! API layer

pub mod http;
