pub mod app;
pub mod backend;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod paths;
pub mod rotation;
pub mod session;
pub mod speech;
pub mod srs;
pub mod state;
pub mod storage;
pub mod store;
pub mod tips;

#[cfg(test)]
pub(crate) mod testing;
