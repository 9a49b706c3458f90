pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod response;
pub mod security;
pub mod state;
pub mod store;
pub mod validation;
