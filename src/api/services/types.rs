//! API 类型定义

use serde::{Deserialize, Serialize};

use crate::capture::CaptureReport;
use crate::storage::LinkSummary;

/// `{code, message, data}` 响应包装
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

/// POST /api/v1/links
#[derive(Deserialize, Clone, Debug)]
pub struct SaveLinkBody {
    pub user_id: i64,
    #[serde(default)]
    pub description: String,
    pub original_url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SaveLinkResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub report: Option<CaptureReport>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLinkResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ListLinksQuery {
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    pub id: i64,
    pub original_url: String,
    pub description: String,
}

impl From<LinkSummary> for LinkItem {
    fn from(link: LinkSummary) -> Self {
        Self {
            id: link.id,
            original_url: link.original_url,
            description: link.description,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LinksResponse {
    pub links: Vec<LinkItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PublicLinkResponse {
    pub generated_url: String,
}

/// Health check types
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub checks: HealthChecks,
    pub response_time_ms: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthChecks {
    pub storage: ComponentCheck,
    pub cache: ComponentCheck,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ComponentCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
