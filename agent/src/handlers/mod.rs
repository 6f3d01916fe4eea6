//! Command handlers

pub mod process;
