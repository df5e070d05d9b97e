// ==========================================
// 炉次化学成分录入系统 - 化学成分记录 API
// ==========================================
// 职责: 炉次选择项、最近化学成分列表、化学成分提交
// 提交流程:
// 1. 未选择炉次 → MissingHeatSelection
// 2. 17 个元素按固定顺序范围校验，首个越界即拒绝
// 3. 解析 Number / Absent，备注去空白
// 4. 单次存储写入（带超时）
// 第 1、2 步失败时不发起任何存储调用
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use crate::api::dto::ChemistryInput;
use crate::api::error::ApiResult;
use crate::api::request::{timed, timed_write};
use crate::api::validator::validate_chemistry;
use crate::config::StoreSettings;
use crate::domain::chemistry::ChemistryRecord;
use crate::domain::heat::HeatOption;
use crate::repository::store::{ChemistryStore, HeatStore};

// ==========================================
// ChemistryApi - 化学成分记录 API
// ==========================================
#[derive(Clone)]
pub struct ChemistryApi {
    heat_store: Arc<dyn HeatStore>,
    chemistry_store: Arc<dyn ChemistryStore>,
    request_timeout: Duration,
    page_size: u32,
}

impl ChemistryApi {
    pub fn new(
        heat_store: Arc<dyn HeatStore>,
        chemistry_store: Arc<dyn ChemistryStore>,
        settings: &StoreSettings,
    ) -> Self {
        Self {
            heat_store,
            chemistry_store,
            request_timeout: settings.request_timeout,
            page_size: settings.chemistry_page_size,
        }
    }

    /// 列表条数
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// 炉次选择项（最新在前）
    pub async fn list_heats_for_selection(&self) -> ApiResult<Vec<HeatOption>> {
        timed("heats.options", self.request_timeout, self.heat_store.list_options()).await
    }

    /// 最近的化学成分记录（最新在前，最多 page_size 条）
    pub async fn list_chemistry(&self) -> ApiResult<Vec<ChemistryRecord>> {
        timed(
            "chemistry.list",
            self.request_timeout,
            self.chemistry_store.list_newest_first(self.page_size),
        )
        .await
    }

    /// 某炉次最近的化学成分记录
    pub async fn list_chemistry_for_heat(&self, heat_id: i64) -> ApiResult<Vec<ChemistryRecord>> {
        timed(
            "chemistry.list_for_heat",
            self.request_timeout,
            self.chemistry_store.list_for_heat(heat_id, self.page_size),
        )
        .await
    }

    /// 提交化学成分
    ///
    /// # 参数
    /// - heat_id: 当前选中的炉次（None 表示未选择）
    /// - input: 表单原始输入
    ///
    /// # 返回
    /// - Ok(ChemistryRecord): 已写入的记录
    /// - Err(MissingHeatSelection / ElementOutOfRange): 本地校验失败
    /// - Err(StoreError / StoreTimeout): 存储端失败（如炉次已不存在）
    pub async fn save_chemistry(
        &self,
        heat_id: Option<i64>,
        input: &ChemistryInput,
    ) -> ApiResult<ChemistryRecord> {
        let record = validate_chemistry(heat_id, input).map_err(|e| {
            tracing::debug!(error = %e, "化学成分提交被本地校验拒绝");
            e
        })?;

        let measured = record.composition.measured_count();
        let saved = timed_write("chemistry.insert", self.request_timeout, |deadline| {
            self.chemistry_store.insert(record, deadline)
        })
        .await?;

        tracing::info!(
            record_id = saved.id,
            heat_id = saved.heat_id,
            measured,
            "化学成分已保存"
        );
        Ok(saved)
    }
}
