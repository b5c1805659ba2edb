pub mod services;

pub use services::configure;
