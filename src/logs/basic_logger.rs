// ==========================================
// 通用数据导入引擎 - 内存日志汇实现
// ==========================================
// 职责: 追加写的内存日志存储（测试与小规模运行）
// ==========================================

use crate::domain::log::{ImportLogEntry, LogFilter};
use crate::error::{ImportError, ImportResult};
use crate::logs::ImportLogger;
use std::sync::Mutex;

// ==========================================
// BasicImportLogger
// ==========================================
#[derive(Default)]
pub struct BasicImportLogger {
    entries: Mutex<Vec<ImportLogEntry>>,
    next_id: Mutex<i64>,
}

impl BasicImportLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全部日志条数（测试用）
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImportLogger for BasicImportLogger {
    fn log(&self, mut entry: ImportLogEntry) -> ImportResult<ImportLogEntry> {
        let mut next_id = self
            .next_id
            .lock()
            .map_err(|_| ImportError::InternalError("日志存储锁中毒".to_string()))?;
        *next_id += 1;
        entry.id = Some(*next_id);

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ImportError::InternalError("日志存储锁中毒".to_string()))?;
        entries.push(entry.clone());
        Ok(entry)
    }

    fn get_logs(&self, filter: &LogFilter) -> ImportResult<Vec<ImportLogEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| ImportError::InternalError("日志存储锁中毒".to_string()))?;
        Ok(entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }

    fn purge_validation_logs(&self, importid: i64) -> ImportResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ImportError::InternalError("日志存储锁中毒".to_string()))?;
        entries.retain(|entry| !(entry.importid == importid && entry.validationstep));
        Ok(())
    }
}
