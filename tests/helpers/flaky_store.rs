// ==========================================
// 可注入故障的存储包装
// ==========================================
// 包装真实仓储，按开关模拟读/写失败或响应延迟
// ==========================================

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use heat_ledger::domain::chemistry::{ChemistryRecord, NewChemistryRecord};
use heat_ledger::domain::heat::{Heat, HeatOption, NewHeat};
use heat_ledger::repository::{ChemistryStore, HeatStore, RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct Faults {
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub delay_ms: AtomicU64,
    pub write_calls: AtomicUsize,
}

impl Faults {
    pub fn set_fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    async fn before_read(&self) -> RepositoryResult<()> {
        self.pause().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::DatabaseQueryError("network unreachable".to_string()));
        }
        Ok(())
    }

    async fn before_write(&self) -> RepositoryResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::DatabaseQueryError("permission denied for table".to_string()));
        }
        Ok(())
    }

    async fn pause(&self) {
        let ms = self.delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

/// 故障包装
pub struct FlakyStore<S> {
    inner: Arc<S>,
    pub faults: Arc<Faults>,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: Arc<S>, faults: Arc<Faults>) -> Self {
        Self { inner, faults }
    }
}

#[async_trait]
impl<S: HeatStore> HeatStore for FlakyStore<S> {
    async fn list_newest_first(&self, limit: Option<u32>) -> RepositoryResult<Vec<Heat>> {
        self.faults.before_read().await?;
        self.inner.list_newest_first(limit).await
    }

    async fn list_options(&self) -> RepositoryResult<Vec<HeatOption>> {
        self.faults.before_read().await?;
        self.inner.list_options().await
    }

    async fn insert(&self, heat: NewHeat, deadline: Instant) -> RepositoryResult<Heat> {
        self.faults.before_write().await?;
        self.inner.insert(heat, deadline).await
    }
}

#[async_trait]
impl<S: ChemistryStore> ChemistryStore for FlakyStore<S> {
    async fn list_newest_first(&self, limit: u32) -> RepositoryResult<Vec<ChemistryRecord>> {
        self.faults.before_read().await?;
        self.inner.list_newest_first(limit).await
    }

    async fn list_for_heat(&self, heat_id: i64, limit: u32) -> RepositoryResult<Vec<ChemistryRecord>> {
        self.faults.before_read().await?;
        self.inner.list_for_heat(heat_id, limit).await
    }

    async fn insert(
        &self,
        record: NewChemistryRecord,
        deadline: Instant,
    ) -> RepositoryResult<ChemistryRecord> {
        self.faults.before_write().await?;
        self.inner.insert(record, deadline).await
    }
}
