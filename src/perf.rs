// ==========================================
// 炉次化学成分录入系统 - 仓储操作耗时
// ==========================================
// PerfGuard: 每次炉次/化学成分仓储操作输出 elapsed_ms 与 SQL 语句数
// 慢 SQL: 单条语句超过 SLOW_SQL_MS 时告警
// 计数为线程局部，仓储操作在 spawn_blocking 线程内同步执行
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// 慢 SQL 阈值（毫秒）
pub const SLOW_SQL_MS: u64 = 200;

thread_local! {
    /// 当前线程已执行的 SQL 语句数
    static SQL_COUNT: Cell<u64> = const { Cell::new(0) };
}

/// 为连接安装语句 profile 回调
pub fn install_sqlite_tracing(conn: &mut Connection) {
    conn.profile(Some(on_statement));
}

fn on_statement(sql: &str, duration: Duration) {
    SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));

    let ms = duration.as_millis() as u64;
    if ms >= SLOW_SQL_MS {
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %sql.split_whitespace().collect::<Vec<_>>().join(" "),
            "slow sql"
        );
    }
}

/// 仓储操作计时
///
/// op 取值: repo.heat.create / repo.heat.find_recent / repo.heat.find_options /
/// repo.chemistry.create / repo.chemistry.find_recent / repo.chemistry.find_by_heat_id
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
            sql_start: SQL_COUNT.with(|c| c.get()),
        }
    }

    /// 本操作至今执行的 SQL 语句数
    pub fn sql_count(&self) -> u64 {
        SQL_COUNT.with(|c| c.get()).saturating_sub(self.sql_start)
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        tracing::debug!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            sql_count = self.sql_count(),
            "done"
        );
    }
}
