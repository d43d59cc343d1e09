// ==========================================
// 通用数据导入引擎 - 课程数据导入器
// ==========================================
// 职责: 课程落库（按 idnumber 新建或更新）+ 自定义字段 + 模板克隆
// 流程: 默认值合并 → 建/改课程 → cf_ 前缀字段落库 → 模板克隆任务入队
// ==========================================

use crate::domain::course::Course;
use crate::domain::field::{FieldDefinition, FieldSchema};
use crate::domain::options::ImportOptions;
use crate::domain::row::{CellValue, Row};
use crate::error::{ImportError, ImportResult};
use crate::importer::row_importer::{ImporterCore, RowImporter};
use crate::repository::CourseRepository;
use crate::task::{CourseRestoreTask, TaskScheduler};
use crate::utils;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// 自定义字段列的默认前缀
pub const DEFAULT_CF_PREFIX: &str = "cf_";

// ==========================================
// CourseDataImporter - 课程数据导入器
// ==========================================
pub struct CourseDataImporter {
    core: ImporterCore,
    schema: FieldSchema,
    repo: Arc<dyn CourseRepository>,
    // 未配置调度器时跳过模板克隆
    scheduler: Option<Arc<dyn TaskScheduler>>,
    cf_prefix: String,
}

impl CourseDataImporter {
    /// 创建课程导入器
    ///
    /// # 参数
    /// - source_schema: 源字段模式（转换前校验所用）
    /// - repo: 课程数据仓储
    pub fn new(source_schema: FieldSchema, repo: Arc<dyn CourseRepository>) -> ImportResult<Self> {
        let mut core = ImporterCore::new(source_schema);

        // 行缺省时的课程默认值
        let default_category = repo.default_category_id()?;
        let midnight = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
        core.set_default_value("idnumber", CellValue::Text(String::new()));
        core.set_default_value("format", CellValue::Text("topics".to_string()));
        core.set_default_value("newsitems", CellValue::Int(0));
        core.set_default_value("numsections", CellValue::Int(5));
        core.set_default_value("summary", CellValue::Text(String::new()));
        core.set_default_value("summaryformat", CellValue::Int(1));
        core.set_default_value("category", CellValue::Int(default_category));
        core.set_default_value("startdate", CellValue::Int(midnight));

        Ok(Self {
            core,
            schema: Self::destination_schema(),
            repo,
            scheduler: None,
            cf_prefix: DEFAULT_CF_PREFIX.to_string(),
        })
    }

    /// 配置延迟任务调度器（启用模板克隆）
    pub fn with_scheduler(mut self, scheduler: Arc<dyn TaskScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// 覆盖自定义字段前缀
    pub fn with_cf_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cf_prefix = prefix.into();
        self
    }

    /// 目标字段模式（转换后校验所用）
    fn destination_schema() -> FieldSchema {
        FieldSchema::new(vec![
            FieldDefinition::text("fullname").required(),
            FieldDefinition::text("shortname"),
            FieldDefinition::text("idnumber"),
            FieldDefinition::text("format"),
            FieldDefinition::int("newsitems"),
            FieldDefinition::int("numsections"),
            FieldDefinition::text("summary"),
            FieldDefinition::int("summaryformat"),
            FieldDefinition::int("category"),
            FieldDefinition::int("startdate"),
            FieldDefinition::text("templatecourseidnumber"),
        ])
    }

    /// 默认值合并：默认值打底、派生短名，行值最终覆盖
    fn apply_defaults(&self, row: &Row) -> Row {
        let mut record = Row::new();
        for (field, value) in &self.core.default_values {
            record.set(field.clone(), value.clone());
        }

        let fullname = row
            .get("fullname")
            .map(|v| v.as_text().to_string())
            .unwrap_or_default();
        record.set(
            "shortname",
            CellValue::Text(Course::derive_shortname(&fullname)),
        );

        for (field, value) in row.iter() {
            record.set(field, value.clone());
        }
        record
    }

    fn build_course(&self, record: &Row, existing: Option<&Course>) -> Course {
        let text = |field: &str| {
            record
                .get(field)
                .map(|v| v.as_text().to_string())
                .unwrap_or_default()
        };
        let int = |field: &str, fallback: i64| {
            record.get(field).and_then(|v| v.as_int()).unwrap_or(fallback)
        };
        let now = Utc::now();
        Course {
            id: existing.and_then(|c| c.id),
            fullname: text("fullname"),
            shortname: text("shortname"),
            idnumber: text("idnumber"),
            format: text("format"),
            newsitems: int("newsitems", 0),
            numsections: int("numsections", 5),
            summary: text("summary"),
            summaryformat: int("summaryformat", 1),
            category: int("category", 1),
            startdate: int("startdate", 0),
            timecreated: existing.map(|c| c.timecreated).unwrap_or(now),
            timemodified: now,
        }
    }

    /// 落库自定义字段（cf_ 前缀列）
    ///
    /// 选择型字段按宽松比较匹配选项，存 1 起的序号；未匹配存 0。
    fn import_custom_fields(&self, row: &Row, course_id: i64) -> ImportResult<()> {
        for (field, value) in row.iter() {
            let Some(shortname) = field.strip_prefix(self.cf_prefix.as_str()) else {
                continue;
            };
            let mut stored = value.as_text().to_string();
            if let Some(options) = self.repo.custom_field_options(shortname)? {
                let mut index_value = 0;
                for (index, option) in options.iter().enumerate() {
                    if utils::equals_ws_accents(&stored, option) {
                        index_value = index + 1;
                        break;
                    }
                }
                stored = index_value.to_string();
            }
            self.repo.upsert_custom_field(course_id, shortname, &stored)?;
        }
        Ok(())
    }

    /// 行指定了模板课程时，将克隆任务入队（即发即忘）
    fn queue_template_restore(&self, record: &Row, course_id: i64) -> ImportResult<()> {
        let Some(template_idnumber) = record.get("templatecourseidnumber") else {
            return Ok(());
        };
        let template_idnumber = template_idnumber.as_text();
        let template_idnumber = template_idnumber.trim();
        if template_idnumber.is_empty() {
            return Ok(());
        }
        let Some(template) = self.repo.find_by_idnumber(template_idnumber)? else {
            debug!(template = template_idnumber, "模板课程不存在，跳过克隆");
            return Ok(());
        };
        let Some(template_id) = template.id else {
            return Ok(());
        };
        match &self.scheduler {
            Some(scheduler) => {
                scheduler.queue(Box::new(CourseRestoreTask::new(
                    Arc::clone(&self.repo),
                    template_id,
                    course_id,
                )));
            }
            None => debug!("未配置任务调度器，跳过模板克隆"),
        }
        Ok(())
    }
}

impl RowImporter for CourseDataImporter {
    fn core(&self) -> &ImporterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ImporterCore {
        &mut self.core
    }

    fn fields_definition(&self) -> &FieldSchema {
        &self.schema
    }

    /// 转换前清洗：去除文本值的首尾空白
    fn fix_before_transform(
        &self,
        row: &mut Row,
        _rowindex: usize,
        _options: &ImportOptions,
    ) -> ImportResult<()> {
        for (_, value) in row.values_mut() {
            if let CellValue::Text(text) = value {
                let trimmed = text.trim().to_string();
                if trimmed.len() != text.len() {
                    *text = trimmed;
                }
            }
        }
        Ok(())
    }

    fn import_row(
        &mut self,
        row: &Row,
        rowindex: usize,
        _options: &ImportOptions,
    ) -> ImportResult<()> {
        let persistence = |e: ImportError| ImportError::Persistence {
            row: rowindex,
            message: e.to_string(),
        };

        let record = self.apply_defaults(row);
        let idnumber = record
            .get("idnumber")
            .map(|v| v.as_text().to_string())
            .unwrap_or_default();

        // 业务主键非空且已存在 → 更新，否则新建
        let existing = if idnumber.is_empty() {
            None
        } else {
            self.repo.find_by_idnumber(&idnumber).map_err(persistence)?
        };

        let course = match existing {
            Some(existing) => {
                let course = self.build_course(&record, Some(&existing));
                self.repo.update_course(&course).map_err(persistence)?;
                debug!(idnumber = %idnumber, "课程已更新");
                course
            }
            None => {
                let course = self
                    .repo
                    .create_course(&self.build_course(&record, None))
                    .map_err(persistence)?;
                debug!(idnumber = %idnumber, "课程已创建");
                course
            }
        };

        let course_id = course.id.ok_or_else(|| ImportError::Persistence {
            row: rowindex,
            message: "课程落库后缺少 id".to_string(),
        })?;

        self.import_custom_fields(&record, course_id)
            .map_err(persistence)?;
        self.queue_template_restore(&record, course_id)
            .map_err(persistence)?;
        Ok(())
    }
}
