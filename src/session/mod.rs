//! 对比会话跟踪：记录进行中与已完成的请求，按存活时间淘汰

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Aggregating,
    Comparing,
    Documenting,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

/// 会话信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub product1: String,
    pub product2: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 会话存储，显式注入到服务状态中
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionInfo>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// 登记一个新会话
    pub async fn begin(&self, product1: &str, product2: &str) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let info = SessionInfo {
            id,
            product1: product1.to_string(),
            product2: product2.to_string(),
            status: SessionStatus::Aggregating,
            started_at: now,
            updated_at: now,
        };
        self.sessions.write().await.insert(id, info);
        id
    }

    /// 更新会话状态，会话已被淘汰时忽略
    pub async fn set_status(&self, id: Uuid, status: SessionStatus) {
        if let Some(info) = self.sessions.write().await.get_mut(&id) {
            info.status = status;
            info.updated_at = Utc::now();
        }
    }

    /// 查询会话，已过期的会话视为不存在
    pub async fn get(&self, id: Uuid) -> Option<SessionInfo> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|info| !self.is_expired(info, now))
            .cloned()
    }

    /// 清除过期会话，返回清除数量
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, info| !self.is_expired(info, now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// 启动后台定时清理任务
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
            loop {
                ticker.tick().await;
                let removed = store.sweep().await;
                if removed > 0 {
                    tracing::debug!(removed, "evicted expired sessions");
                }
            }
        })
    }

    fn is_expired(&self, info: &SessionInfo, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(info.updated_at);
        age.to_std().map(|age| age > self.ttl).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.begin("iPhone 15 Pro", "Pixel 8 Pro").await;

        let info = store.get(id).await.unwrap();
        assert_eq!(info.status, SessionStatus::Aggregating);
        assert_eq!(info.product2, "Pixel 8 Pro");

        store.set_status(id, SessionStatus::Completed).await;
        let info = store.get(id).await.unwrap();
        assert!(info.status.is_finished());
        assert!(info.updated_at >= info.started_at);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.get(Uuid::new_v4()).await.is_none());
        store.set_status(Uuid::new_v4(), SessionStatus::Failed).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sweep_evicts_only_expired() {
        let store = SessionStore::new(Duration::from_secs(60));
        let old = store.begin("A", "B").await;
        let fresh = store.begin("C", "D").await;

        // 把第一个会话的更新时间拨回两分钟前
        store
            .sessions
            .write()
            .await
            .get_mut(&old)
            .unwrap()
            .updated_at = Utc::now() - chrono::Duration::seconds(120);

        assert!(store.get(old).await.is_none());
        assert_eq!(store.sweep().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get(fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_sweep_at_future_time_clears_everything() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.begin("A", "B").await;
        store.begin("C", "D").await;
        let removed = store
            .sweep_at(Utc::now() + chrono::Duration::seconds(61))
            .await;
        assert_eq!(removed, 2);
    }
}
