//! 日志：进程级 tracing 初始化，以及随响应返回的请求日志

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::EnvFilter;

/// 初始化全局 tracing 订阅器
///
/// `RUST_LOG` 优先；否则 verbose 时为 debug，默认 info。
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// 单条请求日志
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// 单次请求内只追加的日志
///
/// Clone 得到的是同一份日志的句柄：请求任务异常终止后，
/// 处理器仍可以通过自己持有的句柄取回已记录的条目。
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into(), None);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message.into(), None);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into(), None);
    }

    pub fn info_with(&self, message: impl Into<String>, context: Value) {
        self.push(LogLevel::Info, message.into(), Some(context));
    }

    pub fn warn_with(&self, message: impl Into<String>, context: Value) {
        self.push(LogLevel::Warn, message.into(), Some(context));
    }

    pub fn error_with(&self, message: impl Into<String>, context: Value) {
        self.push(LogLevel::Error, message.into(), Some(context));
    }

    /// 当前全部条目的快照
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, level: LogLevel, message: String, context: Option<Value>) {
        match (level, &context) {
            (LogLevel::Info, Some(ctx)) => tracing::info!(context = %ctx, "{}", message),
            (LogLevel::Info, None) => tracing::info!("{}", message),
            (LogLevel::Warn, Some(ctx)) => tracing::warn!(context = %ctx, "{}", message),
            (LogLevel::Warn, None) => tracing::warn!("{}", message),
            (LogLevel::Error, Some(ctx)) => tracing::error!(context = %ctx, "{}", message),
            (LogLevel::Error, None) => tracing::error!("{}", message),
        }

        self.lock().push(LogEntry {
            timestamp: Utc::now(),
            level,
            message,
            context,
        });
    }

    // 日志只追加，持锁期间的panic不会留下不一致的状态
    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
