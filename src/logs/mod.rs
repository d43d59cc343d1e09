// ==========================================
// 通用数据导入引擎 - 导入日志层
// ==========================================
// 职责: 失败事件的结构化记录（追加写，按会话过滤/清除）
// 说明: 日志汇在构造处理器时显式注入——不存在进程级单例
// ==========================================

// 模块声明
pub mod basic_logger;
pub mod sqlite_logger;

pub use basic_logger::BasicImportLogger;
pub use sqlite_logger::SqliteImportLogger;

use crate::domain::log::{ImportLogEntry, LogFilter};
use crate::error::{ImportError, ImportResult};
use chrono::Utc;

/// 构造日志条目所需的运行上下文
#[derive(Debug, Clone)]
pub struct LogContext {
    /// 当前行号（致命初始化错误记 0）
    pub linenumber: usize,
    pub module: String,
    pub origin: String,
    pub importid: i64,
    /// 当前是否处于校验（试运行）模式
    pub validationstep: bool,
}

// ==========================================
// ImportLogger Trait
// ==========================================
// 用途: 日志汇主接口
// 实现者: BasicImportLogger（内存）、SqliteImportLogger（rusqlite）
pub trait ImportLogger: Send + Sync {
    /// 追加一条日志，返回已持久化（带 id）的条目
    fn log(&self, entry: ImportLogEntry) -> ImportResult<ImportLogEntry>;

    /// 按过滤条件查询日志
    fn get_logs(&self, filter: &LogFilter) -> ImportResult<Vec<ImportLogEntry>>;

    /// 清除某会话的全部校验日志（validationstep = true）
    ///
    /// 导入日志（validationstep = false）不受影响。
    fn purge_validation_logs(&self, importid: i64) -> ImportResult<()>;

    /// 从管道错误构造并写入日志条目
    ///
    /// 错误自带的行号/字段名优先于上下文值。
    fn log_from_error(
        &self,
        err: &ImportError,
        ctx: &LogContext,
    ) -> ImportResult<ImportLogEntry> {
        let entry = ImportLogEntry {
            id: None,
            linenumber: err.line_number().unwrap_or(ctx.linenumber),
            messagecode: err.message_code().to_string(),
            module: ctx.module.clone(),
            additionalinfo: serde_json::json!({ "info": err.to_string() }),
            fieldname: err.field_name().unwrap_or("").to_string(),
            level: err.level(),
            origin: ctx.origin.clone(),
            importid: ctx.importid,
            validationstep: ctx.validationstep,
            timecreated: Utc::now(),
        };
        self.log(entry)
    }
}
