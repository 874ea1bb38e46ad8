//! creditline library
//!
//! Extracts account credit data from the mirror dashboard, caches it in a
//! config file shared between invocations, and renders it as a status line.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod display;
pub mod error;
pub mod extract;
pub mod git;
pub mod settings;
