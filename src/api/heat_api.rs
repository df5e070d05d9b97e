// ==========================================
// 炉次化学成分录入系统 - 炉次登记 API
// ==========================================
// 职责: 炉次列表查询、炉次新增、炉次选择项
// 炉号为空时本地拒绝，不发起存储调用
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use crate::api::dto::HeatInput;
use crate::api::error::ApiResult;
use crate::api::request::{timed, timed_write};
use crate::api::validator::validate_new_heat;
use crate::config::StoreSettings;
use crate::domain::heat::{Heat, HeatOption};
use crate::repository::store::HeatStore;

// ==========================================
// HeatApi - 炉次登记 API
// ==========================================
#[derive(Clone)]
pub struct HeatApi {
    store: Arc<dyn HeatStore>,
    request_timeout: Duration,
    list_cap: Option<u32>,
}

impl HeatApi {
    pub fn new(store: Arc<dyn HeatStore>, settings: &StoreSettings) -> Self {
        Self {
            store,
            request_timeout: settings.request_timeout,
            list_cap: settings.heat_list_cap,
        }
    }

    /// 查询炉次列表（最新在前）
    pub async fn list_heats(&self) -> ApiResult<Vec<Heat>> {
        let heats = timed(
            "heats.list",
            self.request_timeout,
            self.store.list_newest_first(self.list_cap),
        )
        .await?;
        tracing::debug!(count = heats.len(), "炉次列表已加载");
        Ok(heats)
    }

    /// 查询炉次选择项（最新在前）
    pub async fn list_heat_options(&self) -> ApiResult<Vec<HeatOption>> {
        timed("heats.options", self.request_timeout, self.store.list_options()).await
    }

    /// 新增炉次
    ///
    /// # 返回
    /// - Ok(Heat): 存储端赋值 id / created_at 后的记录
    /// - Err(EmptyHeatCode): 炉号去空白后为空（未发起存储调用）
    /// - Err(StoreError / StoreTimeout): 存储端失败
    pub async fn create_heat(&self, input: &HeatInput) -> ApiResult<Heat> {
        let new_heat = validate_new_heat(input)?;
        let heat = timed_write("heats.insert", self.request_timeout, |deadline| {
            self.store.insert(new_heat, deadline)
        })
        .await?;
        tracing::info!(heat_id = heat.id, heat_code = %heat.heat_code, "炉次已登记");
        Ok(heat)
    }
}
