use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::{StoreError, Visit, VisitStore};

/// 进程内的访问计数存储，用于本地开发和测试
///
/// `DashMap::entry` 在整个 upsert 期间持有分片锁，与 Postgres 的
/// `ON CONFLICT` 一样保证同一 IP 的并发加一不会丢失。
#[derive(Debug, Default)]
pub struct MemoryVisitStore {
    visits: DashMap<String, Visit>,
    next_id: AtomicI64,
}

impl MemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}

#[async_trait]
impl VisitStore for MemoryVisitStore {
    async fn increment_visit(&self, ip: &str) -> Result<(), StoreError> {
        let now = Utc::now();
        self.visits
            .entry(ip.to_string())
            .and_modify(|visit| {
                visit.count += 1;
                visit.updated_at = now;
            })
            .or_insert_with(|| Visit {
                id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                ip: ip.to_string(),
                count: 1,
                created_at: now,
                updated_at: now,
            });

        Ok(())
    }

    async fn get_visit_count(&self, ip: &str) -> Result<i64, StoreError> {
        self.visits
            .get(ip)
            .map(|visit| visit.count)
            .ok_or(StoreError::NotFound)
    }

    async fn get_all_visits(&self) -> Result<Vec<Visit>, StoreError> {
        let mut visits: Vec<Visit> = self.visits.iter().map(|entry| entry.value().clone()).collect();
        visits.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        Ok(visits)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn first_increment_creates_row_with_count_one() {
        let store = MemoryVisitStore::new();
        store.increment_visit("10.0.0.1").await.unwrap();

        assert_eq!(store.get_visit_count("10.0.0.1").await.unwrap(), 1);
        let visits = store.get_all_visits().await.unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].id, 1);
        assert_eq!(visits[0].created_at, visits[0].updated_at);
    }

    #[tokio::test]
    async fn increment_refreshes_updated_at_only() {
        let store = MemoryVisitStore::new();
        store.increment_visit("10.0.0.1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        store.increment_visit("10.0.0.1").await.unwrap();

        let visit = store.get_all_visits().await.unwrap().remove(0);
        assert_eq!(visit.count, 2);
        assert!(visit.updated_at > visit.created_at);
    }

    #[tokio::test]
    async fn unseen_ip_is_not_found() {
        let store = MemoryVisitStore::new();
        assert!(matches!(
            store.get_visit_count("10.0.0.9").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn all_visits_ordered_by_count_then_recency() {
        let store = MemoryVisitStore::new();
        for _ in 0..5 {
            store.increment_visit("a").await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
        for _ in 0..5 {
            store.increment_visit("b").await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
        for _ in 0..3 {
            store.increment_visit("c").await.unwrap();
        }

        let order: Vec<String> = store
            .get_all_visits()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.ip)
            .collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryVisitStore::new());
        let handles: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment_visit("10.0.0.1").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get_visit_count("10.0.0.1").await.unwrap(), 64);
        assert_eq!(store.len(), 1);
    }
}
