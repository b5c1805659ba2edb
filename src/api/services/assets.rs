//! Stored asset serving: `GET /assets/{type}/{name}`

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::error;

use crate::errors::LinkSaverError;
use crate::services::LinkService;

pub async fn serve_asset(
    path: web::Path<(String, String)>,
    service: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let (resource_type, name) = path.into_inner();

    match service.serve_resource(&resource_type, &name).await {
        Ok(resource) => HttpResponse::Ok()
            .insert_header(("Content-Type", resource.content_type))
            .insert_header(("Cache-Control", "public, max-age=3600"))
            .body(resource.content),
        Err(LinkSaverError::Validation(msg)) => plain(StatusCode::BAD_REQUEST, msg),
        Err(e) if e.is_not_found() => plain(StatusCode::NOT_FOUND, "Not Found".to_string()),
        Err(e) => {
            error!("Failed to serve asset {}/{}: {}", resource_type, name, e);
            plain(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            )
        }
    }
}

fn plain(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(("Content-Type", "text/plain; charset=utf-8"))
        .body(body)
}

pub fn asset_routes() -> actix_web::Scope {
    web::scope("/assets").route("/{resource_type}/{name}", web::get().to(serve_asset))
}
