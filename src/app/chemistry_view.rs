// ==========================================
// 炉次化学成分录入系统 - 化学成分记录视图
// ==========================================
// 视图本地状态: 炉次选择项、当前选择、表单、最近记录、提示、提交阶段
// 激活时并发加载炉次选择项与最近记录
// 保存成功只清空表单，保留炉次选择
// ==========================================

use std::sync::Arc;

use crate::api::validator::validate_chemistry;
use crate::api::{ApiError, ChemistryApi, ChemistryInput};
use crate::app::notice::Notice;
use crate::app::submission::{Submission, SubmissionPhase, SubmitOutcome};
use crate::domain::chemistry::ChemistryRecord;
use crate::domain::heat::HeatOption;
use crate::domain::types::Element;

pub struct ChemistryRecorderView {
    api: Arc<ChemistryApi>,
    options: Vec<HeatOption>,
    selected_heat: Option<i64>,
    /// 表单输入
    pub form: ChemistryInput,
    records: Vec<ChemistryRecord>,
    notice: Option<Notice>,
    options_error: Option<ApiError>,
    list_error: Option<ApiError>,
    submission: Submission,
}

impl ChemistryRecorderView {
    pub fn new(api: Arc<ChemistryApi>) -> Self {
        Self {
            api,
            options: Vec::new(),
            selected_heat: None,
            form: ChemistryInput::default(),
            records: Vec::new(),
            notice: None,
            options_error: None,
            list_error: None,
            submission: Submission::new(),
        }
    }

    pub fn heat_options(&self) -> &[HeatOption] {
        &self.options
    }

    pub fn records(&self) -> &[ChemistryRecord] {
        &self.records
    }

    pub fn selected_heat(&self) -> Option<i64> {
        self.selected_heat
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// 最近一次记录列表读取错误
    pub fn list_error(&self) -> Option<&ApiError> {
        self.list_error.as_ref()
    }

    /// 最近一次炉次选择项读取错误
    pub fn options_error(&self) -> Option<&ApiError> {
        self.options_error.as_ref()
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submission.is_submit_enabled()
    }

    /// 选择炉次（None 表示清除选择）
    pub fn select_heat(&mut self, heat_id: Option<i64>) {
        self.selected_heat = heat_id;
    }

    pub fn set_field(&mut self, element: Element, raw: impl Into<String>) {
        self.form.set(element, raw);
    }

    pub fn set_others(&mut self, others: impl Into<String>) {
        self.form.others = others.into();
    }

    /// 视图激活: 并发加载炉次选择项与最近记录
    pub async fn activate(&mut self) {
        let api = self.api.clone();
        let (options, records) =
            futures::join!(api.list_heats_for_selection(), api.list_chemistry());

        match options {
            Ok(options) => {
                self.options = options;
                self.options_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "炉次选择项加载失败");
                self.options_error = Some(err);
            }
        }
        self.apply_records(records);
    }

    /// 重新加载最近记录，失败时保留原列表
    pub async fn reload(&mut self) -> bool {
        let records = self.api.list_chemistry().await;
        self.apply_records(records)
    }

    fn apply_records(&mut self, records: Result<Vec<ChemistryRecord>, ApiError>) -> bool {
        match records {
            Ok(records) => {
                self.records = records;
                self.list_error = None;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "化学成分列表加载失败，保留原列表");
                self.list_error = Some(err);
                false
            }
        }
    }

    /// 提交表单
    pub async fn submit(&mut self) -> SubmitOutcome<ChemistryRecord> {
        if !self.submission.begin() {
            return SubmitOutcome::Busy;
        }
        self.notice = None;

        if let Err(err) = validate_chemistry(self.selected_heat, &self.form) {
            self.submission.step(SubmissionPhase::Rejected);
            return self.finish_with_error(err, SubmitOutcome::Rejected);
        }

        self.submission.step(SubmissionPhase::Inserting);
        match self.api.save_chemistry(self.selected_heat, &self.form).await {
            Ok(record) => {
                self.submission.step(SubmissionPhase::Saved);
                self.form.clear();
                self.notice = Some(Notice::ChemistrySaved);
                self.reload().await;
                self.submission.settle();
                SubmitOutcome::Saved(record)
            }
            Err(err) => {
                self.submission.step(SubmissionPhase::Failed);
                self.finish_with_error(err, SubmitOutcome::Failed)
            }
        }
    }

    fn finish_with_error(
        &mut self,
        err: ApiError,
        outcome: fn(ApiError) -> SubmitOutcome<ChemistryRecord>,
    ) -> SubmitOutcome<ChemistryRecord> {
        self.notice = Some(Notice::Error(err.clone()));
        self.submission.settle();
        outcome(err)
    }
}
