// ==========================================
// 通用数据导入引擎 - 课程 Repository
// ==========================================
// 职责: 课程主数据 + 自定义字段的数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db;
use crate::domain::course::Course;
use crate::error::{ImportError, ImportResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row as SqlRow};
use std::sync::{Arc, Mutex};

// ==========================================
// CourseRepository Trait
// ==========================================
// 用途: 课程落库相关数据访问
// 实现者: SqliteCourseRepository
//
// 注意: 管道契约是同步逐行处理，因此接口保持同步；
// 异步仅出现在延迟任务一侧。
pub trait CourseRepository: Send + Sync {
    /// 建表（幂等）
    fn init_schema(&self) -> ImportResult<()>;

    /// 默认课程分类（最小的根分类 id）
    fn default_category_id(&self) -> ImportResult<i64>;

    /// 按业务主键 idnumber 查找课程
    fn find_by_idnumber(&self, idnumber: &str) -> ImportResult<Option<Course>>;

    /// 新建课程，返回带 id 的记录
    fn create_course(&self, course: &Course) -> ImportResult<Course>;

    /// 按 id 更新既有课程
    fn update_course(&self, course: &Course) -> ImportResult<()>;

    /// 声明一个自定义字段；options 非空表示选择型字段
    fn define_custom_field(&self, shortname: &str, options: Option<&[String]>)
        -> ImportResult<()>;

    /// 选择型字段的选项列表（非选择型字段返回 None）
    fn custom_field_options(&self, shortname: &str) -> ImportResult<Option<Vec<String>>>;

    /// 写入/覆盖课程的自定义字段值
    fn upsert_custom_field(&self, course_id: i64, shortname: &str, value: &str)
        -> ImportResult<()>;

    /// 读取课程的自定义字段值
    fn get_custom_field(&self, course_id: i64, shortname: &str) -> ImportResult<Option<String>>;

    /// 将模板课程的内容复制到目标课程（延迟任务调用）
    fn clone_course_content(&self, template_course_id: i64, course_id: i64) -> ImportResult<()>;

    /// 课程总数（测试与统计用）
    fn count_courses(&self) -> ImportResult<i64>;
}

// ==========================================
// SqliteCourseRepository
// ==========================================
pub struct SqliteCourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCourseRepository {
    /// 打开文件数据库并建表
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = db::open_sqlite_connection(db_path)?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    /// 打开内存数据库并建表（测试用）
    pub fn in_memory() -> ImportResult<Self> {
        let conn = db::open_in_memory_connection()?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn lock(&self) -> ImportResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ImportError::InternalError("数据库连接锁中毒".to_string()))
    }

    fn map_course(row: &SqlRow) -> rusqlite::Result<Course> {
        Ok(Course {
            id: Some(row.get("id")?),
            fullname: row.get("fullname")?,
            shortname: row.get("shortname")?,
            idnumber: row.get("idnumber")?,
            format: row.get("format")?,
            newsitems: row.get("newsitems")?,
            numsections: row.get("numsections")?,
            summary: row.get("summary")?,
            summaryformat: row.get("summaryformat")?,
            category: row.get("category")?,
            startdate: row.get("startdate")?,
            timecreated: row.get::<_, DateTime<Utc>>("timecreated")?,
            timemodified: row.get::<_, DateTime<Utc>>("timemodified")?,
        })
    }
}

impl CourseRepository for SqliteCourseRepository {
    fn init_schema(&self) -> ImportResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS course_categories (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                parent  INTEGER NOT NULL DEFAULT 0,
                name    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS courses (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                fullname      TEXT NOT NULL,
                shortname     TEXT NOT NULL DEFAULT '',
                idnumber      TEXT NOT NULL DEFAULT '',
                format        TEXT NOT NULL DEFAULT 'topics',
                newsitems     INTEGER NOT NULL DEFAULT 0,
                numsections   INTEGER NOT NULL DEFAULT 5,
                summary       TEXT NOT NULL DEFAULT '',
                summaryformat INTEGER NOT NULL DEFAULT 1,
                category      INTEGER NOT NULL,
                startdate     INTEGER NOT NULL DEFAULT 0,
                timecreated   TEXT NOT NULL,
                timemodified  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_courses_idnumber ON courses(idnumber);

            CREATE TABLE IF NOT EXISTS course_custom_fields (
                course_id  INTEGER NOT NULL REFERENCES courses(id),
                shortname  TEXT NOT NULL,
                value      TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (course_id, shortname)
            );

            CREATE TABLE IF NOT EXISTS custom_field_definitions (
                shortname  TEXT PRIMARY KEY,
                options    TEXT
            );
            "#,
        )?;

        // 保证存在一个根分类
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM course_categories WHERE parent = 0", [], |r| {
                r.get(0)
            })?;
        if count == 0 {
            conn.execute(
                "INSERT INTO course_categories (parent, name) VALUES (0, ?1)",
                params!["Default"],
            )?;
        }
        Ok(())
    }

    fn default_category_id(&self) -> ImportResult<i64> {
        let conn = self.lock()?;
        let id: i64 = conn.query_row(
            "SELECT MIN(id) FROM course_categories WHERE parent = 0",
            [],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    fn find_by_idnumber(&self, idnumber: &str) -> ImportResult<Option<Course>> {
        let conn = self.lock()?;
        let course = conn
            .query_row(
                "SELECT * FROM courses WHERE idnumber = ?1 ORDER BY id LIMIT 1",
                params![idnumber],
                Self::map_course,
            )
            .optional()?;
        Ok(course)
    }

    fn create_course(&self, course: &Course) -> ImportResult<Course> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO courses (
                fullname, shortname, idnumber, format, newsitems, numsections,
                summary, summaryformat, category, startdate, timecreated, timemodified
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                course.fullname,
                course.shortname,
                course.idnumber,
                course.format,
                course.newsitems,
                course.numsections,
                course.summary,
                course.summaryformat,
                course.category,
                course.startdate,
                course.timecreated,
                course.timemodified,
            ],
        )?;
        let mut created = course.clone();
        created.id = Some(conn.last_insert_rowid());
        Ok(created)
    }

    fn update_course(&self, course: &Course) -> ImportResult<()> {
        let id = course
            .id
            .ok_or_else(|| ImportError::InternalError("更新课程缺少 id".to_string()))?;
        let conn = self.lock()?;
        conn.execute(
            r#"
            UPDATE courses SET
                fullname = ?1, shortname = ?2, idnumber = ?3, format = ?4,
                newsitems = ?5, numsections = ?6, summary = ?7, summaryformat = ?8,
                category = ?9, startdate = ?10, timemodified = ?11
            WHERE id = ?12
            "#,
            params![
                course.fullname,
                course.shortname,
                course.idnumber,
                course.format,
                course.newsitems,
                course.numsections,
                course.summary,
                course.summaryformat,
                course.category,
                course.startdate,
                Utc::now(),
                id,
            ],
        )?;
        Ok(())
    }

    fn define_custom_field(
        &self,
        shortname: &str,
        options: Option<&[String]>,
    ) -> ImportResult<()> {
        let options_json = match options {
            Some(options) => Some(serde_json::to_string(options).map_err(|e| {
                ImportError::InternalError(format!("自定义字段选项序列化失败: {}", e))
            })?),
            None => None,
        };
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO custom_field_definitions (shortname, options) VALUES (?1, ?2)",
            params![shortname, options_json],
        )?;
        Ok(())
    }

    fn custom_field_options(&self, shortname: &str) -> ImportResult<Option<Vec<String>>> {
        let conn = self.lock()?;
        let options_json: Option<Option<String>> = conn
            .query_row(
                "SELECT options FROM custom_field_definitions WHERE shortname = ?1",
                params![shortname],
                |r| r.get(0),
            )
            .optional()?;
        match options_json.flatten() {
            Some(json) => {
                let options: Vec<String> = serde_json::from_str(&json).map_err(|e| {
                    ImportError::InternalError(format!("自定义字段选项解析失败: {}", e))
                })?;
                Ok(Some(options))
            }
            None => Ok(None),
        }
    }

    fn upsert_custom_field(
        &self,
        course_id: i64,
        shortname: &str,
        value: &str,
    ) -> ImportResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO course_custom_fields (course_id, shortname, value) \
             VALUES (?1, ?2, ?3)",
            params![course_id, shortname, value],
        )?;
        Ok(())
    }

    fn get_custom_field(&self, course_id: i64, shortname: &str) -> ImportResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM course_custom_fields WHERE course_id = ?1 AND shortname = ?2",
                params![course_id, shortname],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn clone_course_content(&self, template_course_id: i64, course_id: i64) -> ImportResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(ImportError::from)?;
        tx.execute(
            r#"
            UPDATE courses SET
                summary     = (SELECT summary FROM courses WHERE id = ?1),
                format      = (SELECT format FROM courses WHERE id = ?1),
                numsections = (SELECT numsections FROM courses WHERE id = ?1),
                timemodified = ?3
            WHERE id = ?2
            "#,
            params![template_course_id, course_id, Utc::now()],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO course_custom_fields (course_id, shortname, value) \
             SELECT ?2, shortname, value FROM course_custom_fields WHERE course_id = ?1",
            params![template_course_id, course_id],
        )?;
        tx.commit().map_err(ImportError::from)?;
        Ok(())
    }

    fn count_courses(&self) -> ImportResult<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM courses", [], |r| r.get(0))?;
        Ok(count)
    }
}
