/// Register a [`TokenStore`](crate::cache::traits::TokenStore) backend under
/// `$name`. The type must provide
/// `async fn from_config(&CacheConfig) -> Result<Self>`.
#[macro_export]
macro_rules! declare_token_store_plugin {
    ($name:expr, $ty:ty) => {
        #[ctor::ctor]
        fn __register_token_store_plugin() {
            use std::sync::Arc;
            use $crate::cache::register::register_token_store_plugin;

            register_token_store_plugin(
                $name,
                Arc::new(|config: $crate::config::CacheConfig| {
                    Box::pin(async move {
                        let store = <$ty>::from_config(&config).await?;
                        Ok(Box::new(store) as Box<dyn $crate::cache::traits::TokenStore>)
                    })
                }),
            );
        }
    };
}
