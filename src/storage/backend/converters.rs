use chrono::{DateTime, Utc};

use crate::storage::{Link, LinkSummary};

/// Link columns without the content blob:
/// (id, user_id, original_url, description, created_at)
pub type LinkRow = (i64, i64, String, String, DateTime<Utc>);

/// 将查询行转换为 Link（owner 为外部用户 ID）
pub fn row_to_link(row: LinkRow, owner: i64) -> Link {
    let (id, _user_id, original_url, description, created_at) = row;
    Link {
        id,
        owner,
        original_url,
        description,
        created_at,
    }
}

pub fn row_to_summary(row: LinkRow) -> LinkSummary {
    let (id, _user_id, original_url, description, _created_at) = row;
    LinkSummary {
        id,
        original_url,
        description,
    }
}
