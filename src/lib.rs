//! link-saver - capture a web page once, serve it back through an expiring link
//!
//! A saved page is stored together with its same-origin scripts, stylesheets
//! and images. Asset references in the stored document are rewritten to the
//! local `/assets/{type}/{address}` route, and the page itself is reachable
//! through `/gen/{user}/{token}` while the token lives in the link cache.
//!
//! # Architecture
//! - `capture`: root fetch, asset discovery, concurrent asset fetch, rewriting
//! - `storage`: sea-orm backed users, links and content-addressed resources
//! - `cache`: pluggable token stores (memory, redis) behind `LinkCache`
//! - `services`: `LinkService`, the operations exposed by API and CLI
//! - `api`: HTTP routes and response envelopes
//! - `config`: TOML + environment configuration
//! - `runtime`: startup, shutdown, server and CLI modes
//! - `system`: logging

pub mod api;
pub mod cache;
pub mod capture;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
