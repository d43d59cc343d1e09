// ==========================================
// 通用数据导入引擎 - SQLite 日志汇实现
// ==========================================
// 职责: 导入日志的持久化存储（使用 rusqlite）
// ==========================================

use crate::db;
use crate::domain::log::{ImportLogEntry, LogFilter, LogLevel};
use crate::error::{ImportError, ImportResult};
use crate::logs::ImportLogger;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row as SqlRow};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteImportLogger
// ==========================================
pub struct SqliteImportLogger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteImportLogger {
    /// 打开文件数据库并建表
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = db::open_sqlite_connection(db_path)?;
        let logger = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        logger.init_schema()?;
        Ok(logger)
    }

    /// 打开内存数据库并建表（测试用）
    pub fn in_memory() -> ImportResult<Self> {
        let conn = db::open_in_memory_connection()?;
        let logger = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        logger.init_schema()?;
        Ok(logger)
    }

    fn init_schema(&self) -> ImportResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS import_logs (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                linenumber     INTEGER NOT NULL,
                messagecode    TEXT NOT NULL,
                module         TEXT NOT NULL DEFAULT '',
                additionalinfo TEXT NOT NULL DEFAULT '',
                fieldname      TEXT NOT NULL DEFAULT '',
                level          INTEGER NOT NULL,
                origin         TEXT NOT NULL DEFAULT '',
                importid       INTEGER NOT NULL DEFAULT 0,
                validationstep INTEGER NOT NULL DEFAULT 0,
                timecreated    TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_import_logs_importid
                ON import_logs(importid, validationstep);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> ImportResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ImportError::InternalError("日志数据库锁中毒".to_string()))
    }

    fn map_entry(row: &SqlRow) -> rusqlite::Result<ImportLogEntry> {
        let additionalinfo_raw: String = row.get("additionalinfo")?;
        let additionalinfo = serde_json::from_str(&additionalinfo_raw)
            .unwrap_or(serde_json::Value::String(additionalinfo_raw));
        Ok(ImportLogEntry {
            id: Some(row.get("id")?),
            linenumber: row.get::<_, i64>("linenumber")? as usize,
            messagecode: row.get("messagecode")?,
            module: row.get("module")?,
            additionalinfo,
            fieldname: row.get("fieldname")?,
            level: LogLevel::from_i64(row.get("level")?),
            origin: row.get("origin")?,
            importid: row.get("importid")?,
            validationstep: row.get("validationstep")?,
            timecreated: row.get::<_, DateTime<Utc>>("timecreated")?,
        })
    }
}

impl ImportLogger for SqliteImportLogger {
    fn log(&self, mut entry: ImportLogEntry) -> ImportResult<ImportLogEntry> {
        let additionalinfo = entry.additionalinfo.to_string();
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO import_logs (
                linenumber, messagecode, module, additionalinfo, fieldname,
                level, origin, importid, validationstep, timecreated
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                entry.linenumber as i64,
                entry.messagecode,
                entry.module,
                additionalinfo,
                entry.fieldname,
                entry.level.as_i64(),
                entry.origin,
                entry.importid,
                entry.validationstep,
                entry.timecreated,
            ],
        )?;
        entry.id = Some(conn.last_insert_rowid());
        Ok(entry)
    }

    fn get_logs(&self, filter: &LogFilter) -> ImportResult<Vec<ImportLogEntry>> {
        let mut sql = String::from("SELECT * FROM import_logs");
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(importid) = filter.importid {
            clauses.push("importid = ?");
            values.push(rusqlite::types::Value::Integer(importid));
        }
        if let Some(validationstep) = filter.validationstep {
            clauses.push("validationstep = ?");
            values.push(rusqlite::types::Value::Integer(validationstep as i64));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params_from_iter(values.iter()), Self::map_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn purge_validation_logs(&self, importid: i64) -> ImportResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM import_logs WHERE importid = ?1 AND validationstep = 1",
            params![importid],
        )?;
        Ok(())
    }
}
