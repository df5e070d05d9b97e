// ==========================================
// 炉次化学成分录入系统 - 存储请求封装
// ==========================================
// 每次存储调用都有超时上限，超时折算为 StoreTimeout
// 读取: 超时即放弃等待
// 写入: 截止时间交给存储端，超时由存储端回滚后报告
// ==========================================

use std::future::Future;
use std::time::{Duration, Instant};

use crate::api::error::{ApiError, ApiResult};
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 带超时地执行一次存储调用
pub(crate) async fn timed<T, F>(op: &'static str, timeout: Duration, fut: F) -> ApiResult<T>
where
    F: Future<Output = RepositoryResult<T>>,
{
    // PerfGuard 为线程局部计数，不能跨 await 持有
    let start = Instant::now();
    let outcome = tokio::time::timeout(timeout, fut).await;
    tracing::debug!(target: "perf", op, elapsed_ms = start.elapsed().as_millis() as u64, "store call");

    match outcome {
        Ok(result) => result.map_err(|e| {
            tracing::warn!(op, error = %e, "存储调用失败");
            ApiError::from(e)
        }),
        Err(_) => {
            let timeout_ms = timeout.as_millis() as u64;
            tracing::warn!(op, timeout_ms, "存储调用超时");
            Err(ApiError::StoreTimeout { op, timeout_ms })
        }
    }
}

/// 带截止时间地执行一次写入
///
/// 写入 future 不会被中途丢弃: 返回 StoreTimeout 时存储端未提交任何行，
/// 返回 Ok 时行已提交（即使提交略晚于截止时间）
pub(crate) async fn timed_write<T, F, Fut>(op: &'static str, timeout: Duration, write: F) -> ApiResult<T>
where
    F: FnOnce(Instant) -> Fut,
    Fut: Future<Output = RepositoryResult<T>>,
{
    let start = Instant::now();
    let outcome = write(start + timeout).await;
    tracing::debug!(target: "perf", op, elapsed_ms = start.elapsed().as_millis() as u64, "store write");

    match outcome {
        Ok(value) => Ok(value),
        Err(RepositoryError::DeadlineExceeded) => {
            let timeout_ms = timeout.as_millis() as u64;
            tracing::warn!(op, timeout_ms, "存储写入超时，已回滚");
            Err(ApiError::StoreTimeout { op, timeout_ms })
        }
        Err(e) => {
            tracing::warn!(op, error = %e, "存储写入失败");
            Err(ApiError::from(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timed_passes_value_through() {
        let result = timed("ok", Duration::from_secs(1), async { Ok::<_, RepositoryError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_timed_maps_store_error() {
        let result: ApiResult<()> = timed("fail", Duration::from_secs(1), async {
            Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
        })
        .await;
        assert_eq!(result, Err(ApiError::StoreError("disk I/O error".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_reports_timeout() {
        let result: ApiResult<()> = timed("slow", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(
            result,
            Err(ApiError::StoreTimeout { op: "slow", timeout_ms: 50 })
        );
    }

    #[tokio::test]
    async fn test_timed_write_passes_deadline() {
        let before = Instant::now();
        let result = timed_write("write", Duration::from_millis(200), |deadline| async move {
            Ok::<_, RepositoryError>(deadline)
        })
        .await
        .unwrap();
        assert!(result >= before + Duration::from_millis(200));
        assert!(result <= Instant::now() + Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_timed_write_maps_deadline_to_timeout() {
        let result: ApiResult<()> = timed_write("chemistry.insert", Duration::from_millis(50), |_| async {
            Err(RepositoryError::DeadlineExceeded)
        })
        .await;
        assert_eq!(
            result,
            Err(ApiError::StoreTimeout { op: "chemistry.insert", timeout_ms: 50 })
        );
    }

    #[tokio::test]
    async fn test_timed_write_keeps_late_commit() {
        // 存储端已提交则返回 Ok，不折算为超时
        let result = timed_write("write", Duration::from_millis(10), |_| async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            Ok::<_, RepositoryError>(1)
        })
        .await;
        assert_eq!(result, Ok(1));
    }
}
