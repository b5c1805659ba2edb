//! Public page serving: `GET /gen/{user_id}/{token}`

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, error};

use crate::services::LinkService;

pub struct PageService;

impl PageService {
    pub async fn serve(
        path: web::Path<(i64, String)>,
        service: web::Data<Arc<LinkService>>,
    ) -> impl Responder {
        let (user_id, token) = path.into_inner();

        match service.serve_page(user_id, &token).await {
            Ok(page) => HttpResponse::Ok()
                .insert_header(("Content-Type", page.content_type()))
                .insert_header(("Cache-Control", "private, no-store"))
                .body(page.bytes),
            Err(e) if e.is_not_found() => {
                debug!("Public link miss for user {}", user_id);
                Self::not_found_response()
            }
            Err(e) => {
                error!("Failed to serve page for user {}: {}", user_id, e);
                HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                    .insert_header(("Content-Type", "text/plain; charset=utf-8"))
                    .body("Internal Server Error")
            }
        }
    }

    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body("not found / expired")
    }
}

pub fn page_routes() -> actix_web::Scope {
    web::scope("/gen")
        .route("/{user_id}/{token}", web::get().to(PageService::serve))
        .route("/{user_id}/{token}", web::head().to(PageService::serve))
}
