// ==========================================
// 炉次化学成分录入系统 - 存储接口 Trait
// ==========================================
// 职责: 定义“按时间倒序查询 + 单行写入”的抽象存储能力
// 红线: Repository 不含业务规则，只做数据读写
// 实现者: HeatRepository / ChemistryRepository（使用 rusqlite）
// ==========================================

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::chemistry::{ChemistryRecord, NewChemistryRecord};
use crate::domain::heat::{Heat, HeatOption, NewHeat};
use crate::repository::error::RepositoryResult;

// ==========================================
// HeatStore Trait
// ==========================================
#[async_trait]
pub trait HeatStore: Send + Sync {
    /// 按 created_at 倒序查询炉次
    ///
    /// # 参数
    /// - limit: 返回上限（None 表示不限）
    async fn list_newest_first(&self, limit: Option<u32>) -> RepositoryResult<Vec<Heat>>;

    /// 按 created_at 倒序查询 (id, heat_code) 选择项
    async fn list_options(&self) -> RepositoryResult<Vec<HeatOption>>;

    /// 写入一行炉次，返回存储端赋值后的完整记录
    ///
    /// 超过 deadline 时不得提交，返回 Err(DeadlineExceeded)
    async fn insert(&self, heat: NewHeat, deadline: Instant) -> RepositoryResult<Heat>;
}

// ==========================================
// ChemistryStore Trait
// ==========================================
#[async_trait]
pub trait ChemistryStore: Send + Sync {
    /// 按 created_at 倒序查询化学成分记录
    ///
    /// # 参数
    /// - limit: 返回上限
    async fn list_newest_first(&self, limit: u32) -> RepositoryResult<Vec<ChemistryRecord>>;

    /// 按 created_at 倒序查询某炉次下的化学成分记录
    async fn list_for_heat(&self, heat_id: i64, limit: u32)
        -> RepositoryResult<Vec<ChemistryRecord>>;

    /// 写入一行化学成分记录，返回存储端赋值后的完整记录
    ///
    /// # 返回
    /// - Err(ForeignKeyViolation): heat_id 不存在
    /// - Err(DeadlineExceeded): 超过 deadline，未提交
    async fn insert(
        &self,
        record: NewChemistryRecord,
        deadline: Instant,
    ) -> RepositoryResult<ChemistryRecord>;
}
