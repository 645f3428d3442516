pub mod agent;
pub mod api_key;
pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatters;
pub mod http;
pub mod logging;
pub mod models;
pub mod service;
