use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

use once_cell::sync::Lazy;

use crate::cache::traits::TokenStore;
use crate::config::CacheConfig;
use crate::errors::Result;

pub type BoxedTokenStoreFuture = Pin<Box<dyn Future<Output = Result<Box<dyn TokenStore>>> + Send>>;
pub type TokenStoreConstructor = Arc<dyn Fn(CacheConfig) -> BoxedTokenStoreFuture + Send + Sync>;

static TOKEN_STORE_REGISTRY: Lazy<RwLock<HashMap<String, TokenStoreConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register_token_store_plugin<S: Into<String>>(name: S, constructor: TokenStoreConstructor) {
    let name = name.into();
    let mut registry = TOKEN_STORE_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.insert(name, constructor);
}

pub fn get_token_store_plugin(name: &str) -> Option<TokenStoreConstructor> {
    TOKEN_STORE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(name)
        .cloned()
}

pub fn debug_cache_registry() {
    let registry = TOKEN_STORE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if registry.is_empty() {
        tracing::debug!("No token store plugins registered.");
    } else {
        tracing::debug!("Registered token store plugins:");
        for key in registry.keys() {
            tracing::debug!(" - {}", key);
        }
    }
}
