// ==========================================
// 炉次化学成分录入系统 - 炉次登记视图
// ==========================================
// 视图本地状态: 表单、当前列表、提示、提交阶段
// 成功: 清空表单并刷新列表
// 失败: 保留输入，展示存储端原文
// 读取失败: 保留上一次列表
// ==========================================

use std::sync::Arc;

use crate::api::validator::validate_new_heat;
use crate::api::{ApiError, HeatApi, HeatInput};
use crate::app::notice::Notice;
use crate::app::submission::{Submission, SubmissionPhase, SubmitOutcome};
use crate::domain::heat::Heat;

pub struct HeatRegistryView {
    api: Arc<HeatApi>,
    /// 表单输入
    pub form: HeatInput,
    heats: Vec<Heat>,
    notice: Option<Notice>,
    list_error: Option<ApiError>,
    submission: Submission,
}

impl HeatRegistryView {
    pub fn new(api: Arc<HeatApi>) -> Self {
        Self {
            api,
            form: HeatInput::default(),
            heats: Vec::new(),
            notice: None,
            list_error: None,
            submission: Submission::new(),
        }
    }

    pub fn heats(&self) -> &[Heat] {
        &self.heats
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// 最近一次列表读取错误
    pub fn list_error(&self) -> Option<&ApiError> {
        self.list_error.as_ref()
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submission.is_submit_enabled()
    }

    /// 视图激活: 加载列表
    pub async fn activate(&mut self) {
        self.reload().await;
    }

    /// 重新加载列表，失败时保留原列表
    pub async fn reload(&mut self) -> bool {
        match self.api.list_heats().await {
            Ok(heats) => {
                self.heats = heats;
                self.list_error = None;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "炉次列表加载失败，保留原列表");
                self.list_error = Some(err);
                false
            }
        }
    }

    /// 提交表单
    pub async fn submit(&mut self) -> SubmitOutcome<Heat> {
        if !self.submission.begin() {
            return SubmitOutcome::Busy;
        }
        self.notice = None;

        if let Err(err) = validate_new_heat(&self.form) {
            self.submission.step(SubmissionPhase::Rejected);
            return self.finish_with_error(err, SubmitOutcome::Rejected);
        }

        self.submission.step(SubmissionPhase::Inserting);
        match self.api.create_heat(&self.form).await {
            Ok(heat) => {
                self.submission.step(SubmissionPhase::Saved);
                self.form = HeatInput::default();
                self.notice = Some(Notice::HeatSaved);
                self.reload().await;
                self.submission.settle();
                SubmitOutcome::Saved(heat)
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
        outcome: fn(ApiError) -> SubmitOutcome<Heat>,
    ) -> SubmitOutcome<Heat> {
        self.notice = Some(Notice::Error(err.clone()));
        self.submission.settle();
        outcome(err)
    }
}
