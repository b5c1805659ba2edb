use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{error, trace};

use crate::services::LinkService;

use super::error_code::ErrorCode;
use super::helpers::json_response;
use super::types::{ComponentCheck, HealthChecks, HealthResponse};

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

async fn probe<F>(backend: String, fut: F) -> ComponentCheck
where
    F: std::future::Future<Output = crate::errors::Result<()>>,
{
    let error = match tokio::time::timeout(PROBE_TIMEOUT, fut).await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(_) => Some("timeout".to_string()),
    };
    if let Some(ref e) = error {
        error!("{} health check failed: {}", backend, e);
    }
    ComponentCheck {
        status: if error.is_none() { "healthy" } else { "unhealthy" }.to_string(),
        backend,
        error,
    }
}

/// Health Service
///
/// 直接探测存储与缓存，不经过业务逻辑。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<Arc<LinkService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let storage = service.storage();
        let cache = service.cache();
        let storage_check = probe(
            storage.get_backend_config().storage_type,
            storage.ping(),
        )
        .await;
        let cache_check = probe(cache.backend_name().to_string(), cache.ping()).await;

        let is_healthy = storage_check.error.is_none() && cache_check.error.is_none();
        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        let data = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime,
            checks: HealthChecks {
                storage: storage_check,
                cache: cache_check,
            },
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        if is_healthy {
            json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
        } else {
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "unhealthy",
                Some(data),
            )
        }
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
}
