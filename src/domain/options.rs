// ==========================================
// 通用数据导入引擎 - 导入选项
// ==========================================
// 职责: 贯穿管道各阶段的不透明扩展选项
// ==========================================

use serde::{Deserialize, Serialize};

/// 单次导入运行的扩展选项
///
/// 管道本身不解释其内容；具体数据源/导入器按需读取。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    #[serde(default)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.extra.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.extra.is_empty()
    }
}
