// ==========================================
// 炉次化学成分录入系统 - 提交状态机
// ==========================================
// Idle → Validating → (Rejected | Inserting) → (Saved | Failed) → Idle
// 非 Idle 状态下提交控件不可用
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::api::ApiError;

/// 单次提交所处阶段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Rejected,
    Inserting,
    Saved,
    Failed,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionPhase::Idle => "IDLE",
            SubmissionPhase::Validating => "VALIDATING",
            SubmissionPhase::Rejected => "REJECTED",
            SubmissionPhase::Inserting => "INSERTING",
            SubmissionPhase::Saved => "SAVED",
            SubmissionPhase::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

impl SubmissionPhase {
    /// 是否允许迁移到目标阶段
    pub fn can_transition_to(self, to: SubmissionPhase) -> bool {
        use SubmissionPhase::*;
        matches!(
            (self, to),
            (Idle, Validating)
                | (Validating, Rejected)
                | (Validating, Inserting)
                | (Inserting, Saved)
                | (Inserting, Failed)
                | (Rejected, Idle)
                | (Saved, Idle)
                | (Failed, Idle)
        )
    }

    /// 终态（结束后回到 Idle）
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionPhase::Rejected | SubmissionPhase::Saved | SubmissionPhase::Failed
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("提交状态转换非法: {from} -> {to}")]
pub struct InvalidStateTransition {
    pub from: SubmissionPhase,
    pub to: SubmissionPhase,
}

/// 视图内的提交状态
#[derive(Debug, Clone, Default)]
pub struct Submission {
    phase: SubmissionPhase,
    history: Vec<SubmissionPhase>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// 提交控件是否可用
    pub fn is_submit_enabled(&self) -> bool {
        self.phase == SubmissionPhase::Idle
    }

    /// 最近一次提交经过的阶段（不含起始 Idle）
    pub fn last_path(&self) -> &[SubmissionPhase] {
        &self.history
    }

    /// 迁移到目标阶段
    pub fn advance(&mut self, to: SubmissionPhase) -> Result<(), InvalidStateTransition> {
        if !self.phase.can_transition_to(to) {
            return Err(InvalidStateTransition { from: self.phase, to });
        }
        if self.phase == SubmissionPhase::Idle {
            self.history.clear();
        }
        tracing::trace!(from = %self.phase, to = %to, "提交状态迁移");
        self.phase = to;
        self.history.push(to);
        Ok(())
    }

    /// 开始一次提交；非 Idle 时返回 false
    pub fn begin(&mut self) -> bool {
        self.advance(SubmissionPhase::Validating).is_ok()
    }

    /// 视图流程内的迁移；流程本身保证合法，非法时仅记录
    pub(crate) fn step(&mut self, to: SubmissionPhase) {
        if let Err(e) = self.advance(to) {
            tracing::error!("{}", e);
        }
    }

    /// 从终态回到 Idle
    pub fn settle(&mut self) {
        if self.phase.is_terminal() {
            self.phase = SubmissionPhase::Idle;
            self.history.push(SubmissionPhase::Idle);
        }
    }
}

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// 上一次提交尚未结束
    Busy,
    /// 本地校验拒绝，未发起存储调用
    Rejected(ApiError),
    Saved(T),
    /// 存储端失败，表单保留
    Failed(ApiError),
}

impl<T> SubmitOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            SubmitOutcome::Rejected(e) | SubmitOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}
