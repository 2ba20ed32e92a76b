// src/repositories/memory.rs

use std::sync::Arc;
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use smspay_common::models::ProgressRecord;
use smspay_common::traits::repository_traits::ProgressRepository;
use crate::Error;

/// Process-local progress store. Used in test mode and by tests.
#[derive(Clone, Default)]
pub struct InMemoryProgressRepository {
    records: Arc<DashMap<String, ProgressRecord>>,
    redeemed: Arc<DashSet<String>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, e.g. to simulate progress persisted before a restart.
    pub fn with_progress(self, product_id: &str, sent_count: u32, total: u32) -> Self {
        self.records.insert(
            product_id.to_string(),
            ProgressRecord {
                product_id: product_id.to_string(),
                sent_count,
                total_count: Some(total),
                cancelled: false,
                redeemed: false,
            },
        );
        self
    }

    fn update<F: FnOnce(&mut ProgressRecord)>(&self, product_id: &str, f: F) {
        let mut entry = self
            .records
            .entry(product_id.to_string())
            .or_insert_with(|| ProgressRecord::empty(product_id));
        f(entry.value_mut());
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn get_progress(&self, product_id: &str) -> Result<ProgressRecord, Error> {
        let mut record = self
            .records
            .get(product_id)
            .map(|r| r.value().clone())
            .unwrap_or_else(|| ProgressRecord::empty(product_id));
        record.redeemed = self.redeemed.contains(product_id);
        Ok(record)
    }

    async fn set_sent_count(&self, product_id: &str, sent_count: u32) -> Result<(), Error> {
        let current = self.records.get(product_id).map(|r| r.sent_count).unwrap_or(0);
        if sent_count < current {
            return Err(Error::Storage(format!(
                "refusing to lower sent_count:{product_id} from {current} to {sent_count}"
            )));
        }
        self.update(product_id, |r| r.sent_count = sent_count);
        Ok(())
    }

    async fn set_total_count(&self, product_id: &str, total: u32) -> Result<(), Error> {
        self.update(product_id, |r| r.total_count = Some(total));
        Ok(())
    }

    async fn mark_cancelled(&self, product_id: &str, cancelled: bool) -> Result<(), Error> {
        self.update(product_id, |r| r.cancelled = cancelled);
        Ok(())
    }

    async fn mark_redeemed(&self, product_id: &str) -> Result<(), Error> {
        self.redeemed.insert(product_id.to_string());
        Ok(())
    }

    async fn list_redeemed(&self) -> Result<Vec<String>, Error> {
        let mut out: Vec<String> = self.redeemed.iter().map(|p| p.key().clone()).collect();
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_product_reads_as_empty() -> Result<(), Error> {
        let repo = InMemoryProgressRepository::new();
        let rec = repo.get_progress("nope").await?;
        assert_eq!(rec, ProgressRecord::empty("nope"));
        Ok(())
    }

    #[tokio::test]
    async fn sent_count_never_decreases() -> Result<(), Error> {
        let repo = InMemoryProgressRepository::new();
        repo.set_sent_count("p", 3).await?;
        assert!(repo.set_sent_count("p", 2).await.is_err());
        assert_eq!(repo.get_progress("p").await?.sent_count, 3);
        Ok(())
    }

    #[tokio::test]
    async fn redeemed_set_is_shared_across_clones() -> Result<(), Error> {
        let repo = InMemoryProgressRepository::new();
        let clone = repo.clone();
        clone.mark_redeemed("b").await?;
        clone.mark_redeemed("a").await?;
        clone.mark_redeemed("a").await?;
        assert_eq!(repo.list_redeemed().await?, vec!["a".to_string(), "b".to_string()]);
        assert!(repo.is_redeemed("a").await?);
        Ok(())
    }
}
