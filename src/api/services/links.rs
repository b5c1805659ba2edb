//! Link API handlers (`/api/v1`)

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{info, trace, warn};

use crate::services::{LinkService, SaveLinkRequest};

use super::error_code::ErrorCode;
use super::helpers::{api_result, json_response, success_response};
use super::types::{
    DeleteLinkResponse, LinkItem, LinksResponse, ListLinksQuery, PublicLinkResponse,
    SaveLinkBody, SaveLinkResponse,
};

/// POST /links
pub async fn post_link(
    body: web::Json<SaveLinkBody>,
    service: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let body = body.into_inner();
    trace!(
        "API: save request from user {} for {}",
        body.user_id, body.original_url
    );

    let request = SaveLinkRequest {
        user_id: body.user_id,
        description: body.description,
        original_url: body.original_url,
    };

    match service.save_link(request).await {
        Ok(saved) => {
            info!("API: link {} saved", saved.link_id);
            success_response(SaveLinkResponse {
                success: true,
                message: format!("saved {}", saved.original_url),
                link_id: Some(saved.link_id),
                report: Some(saved.report),
            })
        }
        Err(e) => {
            warn!("API: save failed: {}", e);
            json_response(
                e.http_status(),
                ErrorCode::from(&e),
                e.message(),
                Some(SaveLinkResponse {
                    success: false,
                    message: e.message().to_string(),
                    link_id: None,
                    report: None,
                }),
            )
        }
    }
}

/// GET /users/{user_id}/links?description=
pub async fn get_links(
    path: web::Path<i64>,
    query: web::Query<ListLinksQuery>,
    service: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let user_id = path.into_inner();
    let result = match query.description.as_deref() {
        Some(description) if !description.is_empty() => {
            service.get_links(user_id, description).await
        }
        _ => service.get_all_links(user_id).await,
    };

    api_result(result.map(|links| LinksResponse {
        links: links.into_iter().map(LinkItem::from).collect(),
    }))
}

/// GET /users/{user_id}/links/{link_id}/public
pub async fn get_public_link(
    path: web::Path<(i64, i64)>,
    service: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let (user_id, link_id) = path.into_inner();
    api_result(
        service
            .get_public_link(user_id, link_id)
            .await
            .map(|generated_url| PublicLinkResponse { generated_url }),
    )
}

/// DELETE /links/{link_id}
pub async fn delete_link(
    path: web::Path<i64>,
    service: web::Data<Arc<LinkService>>,
) -> impl Responder {
    let link_id = path.into_inner();
    match service.delete_link(link_id).await {
        Ok(_) => success_response(DeleteLinkResponse {
            success: true,
            message: format!("link {} deleted", link_id),
        }),
        Err(e) => json_response(
            e.http_status(),
            ErrorCode::from(&e),
            e.message(),
            Some(DeleteLinkResponse {
                success: false,
                message: e.message().to_string(),
            }),
        ),
    }
}

/// Body parse failures use the same envelope as every other error
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response: HttpResponse = json_response::<()>(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            err.to_string(),
            None,
        );
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

/// 链接路由 `/api/v1`
pub fn link_routes() -> actix_web::Scope {
    web::scope("/api/v1")
        .app_data(json_config())
        .route("/links", web::post().to(post_link))
        .route("/links/{link_id}", web::delete().to(delete_link))
        .route("/users/{user_id}/links", web::get().to(get_links))
        .route(
            "/users/{user_id}/links/{link_id}/public",
            web::get().to(get_public_link),
        )
}
