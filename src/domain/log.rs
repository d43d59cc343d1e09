// ==========================================
// 通用数据导入引擎 - 导入日志模型
// ==========================================
// 职责: 结构化诊断记录（每个失败事件恰好一条，创建后不可变）
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 日志级别
///
/// 仅 Error 级别计入整体运行结果；Warning/Info 仅作诊断信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// 持久化用的整数编码
    pub fn as_i64(&self) -> i64 {
        match self {
            LogLevel::Info => 0,
            LogLevel::Warning => 1,
            LogLevel::Error => 2,
        }
    }

    /// 从整数编码还原；未知值按 Warning 处理
    pub fn from_i64(value: i64) -> Self {
        match value {
            0 => LogLevel::Info,
            2 => LogLevel::Error,
            _ => LogLevel::Warning,
        }
    }

    /// 本地化的级别名称
    pub fn display_name(&self) -> String {
        let key = match self {
            LogLevel::Info => "log.level.info",
            LogLevel::Warning => "log.level.warning",
            LogLevel::Error => "log.level.error",
        };
        crate::i18n::t(key)
    }
}

/// 一条导入日志
///
/// `validationstep` 为 true 当且仅当产生该日志时处理器处于校验（试运行）模式；
/// 这是“清除历史校验日志”操作的唯一判别条件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportLogEntry {
    /// 存储分配的标识（未持久化时为 None）
    pub id: Option<i64>,
    /// 行号（0 起；致命初始化错误记 0）
    pub linenumber: usize,
    /// 消息代码（经 i18n 渲染为可读消息）
    pub messagecode: String,
    /// 产生日志的模块标识
    pub module: String,
    /// 附加信息（JSON）
    pub additionalinfo: serde_json::Value,
    /// 相关字段名（无则为空串）
    pub fieldname: String,
    pub level: LogLevel,
    /// 数据源标识，如 "file:/path/to.csv"
    pub origin: String,
    /// 导入会话标识
    pub importid: i64,
    /// 是否产生于校验（试运行）模式
    pub validationstep: bool,
    pub timecreated: DateTime<Utc>,
}

impl ImportLogEntry {
    /// Error 级别会使整体导入/校验结果判为失败
    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    /// 渲染可读消息，如 "警告（行 2，字段:fullname）: 必填字段缺失"
    pub fn full_message(&self) -> String {
        let message = crate::i18n::t(&format!("error.{}", self.messagecode));
        let level = self.level.display_name();
        let line = self.linenumber.to_string();
        crate::i18n::t_with_args(
            "importlog.message",
            &[
                ("level", level.as_str()),
                ("line", line.as_str()),
                ("fieldname", self.fieldname.as_str()),
                ("message", message.as_str()),
            ],
        )
    }
}

/// 日志查询过滤条件
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFilter {
    pub importid: Option<i64>,
    pub validationstep: Option<bool>,
}

impl LogFilter {
    pub fn for_import(importid: i64) -> Self {
        Self {
            importid: Some(importid),
            validationstep: None,
        }
    }

    pub fn validation_step(importid: i64) -> Self {
        Self {
            importid: Some(importid),
            validationstep: Some(true),
        }
    }

    /// 判断一条日志是否满足过滤条件
    pub fn matches(&self, entry: &ImportLogEntry) -> bool {
        if let Some(importid) = self.importid {
            if entry.importid != importid {
                return false;
            }
        }
        if let Some(step) = self.validationstep {
            if entry.validationstep != step {
                return false;
            }
        }
        true
    }
}
