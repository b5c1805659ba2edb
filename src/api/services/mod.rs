pub mod assets;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod links;
pub mod pages;
pub mod types;

use actix_web::web;

pub use assets::asset_routes;
pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use links::link_routes;
pub use pages::{PageService, page_routes};
pub use types::ApiResponse;

/// Mount every route. Expects `web::Data<Arc<LinkService>>` and
/// `web::Data<AppStartTime>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_routes())
        .service(link_routes())
        .service(page_routes())
        .service(asset_routes());
}
