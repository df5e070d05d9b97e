// ==========================================
// 炉次化学成分录入系统 - 环境就绪检查
// ==========================================
// 供运维工具使用，核心逻辑不依赖
// 唯一载荷: {"ok": bool}
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvReadiness {
    pub ok: bool,
}

impl EnvReadiness {
    /// 两个必需配置值均存在且非空白时 ok = true
    ///
    /// 仅含空白的值与配置加载一致，按未设置处理
    pub fn check(store_url: Option<&str>, store_key: Option<&str>) -> Self {
        let present = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());
        Self {
            ok: present(store_url) && present(store_key),
        }
    }

    /// JSON 载荷
    pub fn to_json(&self) -> String {
        serde_json::json!({ "ok": self.ok }).to_string()
    }
}
