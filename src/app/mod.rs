// ==========================================
// 炉次化学成分录入系统 - 应用层
// ==========================================
// 职责: 共享状态装配、视图本地状态、表格输出
// ==========================================

pub mod chemistry_view;
pub mod heat_view;
pub mod notice;
pub mod state;
pub mod submission;
pub mod table;

// 重导出
pub use chemistry_view::ChemistryRecorderView;
pub use heat_view::HeatRegistryView;
pub use notice::Notice;
pub use state::{get_default_db_path, AppState};
pub use submission::{Submission, SubmissionPhase, SubmitOutcome};
