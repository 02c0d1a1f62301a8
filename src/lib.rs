//! refugee-flows: resolves the daily refugee flows report published under an
//! unstable naming scheme, downloads it, and remembers the filename that
//! worked so later runs go straight to it.

pub mod cache;
pub mod candidates;
pub mod cli;
pub mod config;
pub mod driver;
pub mod errors;
pub mod fetcher;
pub mod input;
pub mod models;
pub mod properties;
pub mod resolver;
pub mod retry;
