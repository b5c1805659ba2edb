pub mod url_validator;

pub use url_validator::{UrlValidationError, parse_source_url};
