// ==========================================
// 炉次化学成分录入系统 - 写入截止时间
// ==========================================
// 写入在事务内执行，提交前检查截止时间
// 超时: 回滚并返回 DeadlineExceeded，存储端不留下任何行
// 等待写锁（busy）的时长不超过剩余时间，等不到即视为超时
// ==========================================

use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use std::time::{Duration, Instant};

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 距截止时间的剩余时长
pub(crate) fn remaining(deadline: Instant) -> RepositoryResult<Duration> {
    match deadline.checked_duration_since(Instant::now()) {
        Some(left) if !left.is_zero() => Ok(left),
        _ => Err(RepositoryError::DeadlineExceeded),
    }
}

/// 在截止时间前完成一次写事务
///
/// # 参数
/// - deadline: None 表示不限时
///
/// # 返回
/// - Ok: 事务已提交
/// - Err(DeadlineExceeded): 取得连接时或提交前已超时，事务已回滚
/// - Err(其他): 写入失败，事务已回滚
pub(crate) fn write_before<T, F>(
    conn: &mut Connection,
    deadline: Option<Instant>,
    write: F,
) -> RepositoryResult<T>
where
    F: FnOnce(&Transaction<'_>) -> RepositoryResult<T>,
{
    let Some(deadline) = deadline else {
        return commit(conn, None, write);
    };

    conn.busy_timeout(remaining(deadline)?)?;
    let result = commit(conn, Some(deadline), write);
    if let Err(e) = conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS)) {
        tracing::warn!(error = %e, "busy_timeout 恢复失败");
    }
    result
}

fn commit<T, F>(conn: &mut Connection, deadline: Option<Instant>, write: F) -> RepositoryResult<T>
where
    F: FnOnce(&Transaction<'_>) -> RepositoryResult<T>,
{
    // IMMEDIATE: 开始即取写锁，busy 等待发生在 BEGIN 上
    let tx = match conn.transaction_with_behavior(TransactionBehavior::Immediate) {
        Ok(tx) => tx,
        Err(e) if deadline.is_some() && e.sqlite_error_code() == Some(ErrorCode::DatabaseBusy) => {
            return Err(RepositoryError::DeadlineExceeded);
        }
        Err(e) => return Err(e.into()),
    };
    let out = write(&tx)?;
    if let Some(deadline) = deadline {
        remaining(deadline)?;
    }
    tx.commit()?;
    Ok(out)
}
