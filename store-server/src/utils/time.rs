//! 时间工具函数
//!
//! 所有持久化时间戳统一为 RFC3339 UTC 字符串，由 Rust 侧生成；
//! 固定宽度毫秒格式保证 `ORDER BY created_at` 按时间排序。

use chrono::{SecondsFormat, Utc};

/// 当前时刻的 RFC3339 UTC 字符串 (毫秒精度)
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
