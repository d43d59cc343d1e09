// ==========================================
// 通用数据导入引擎 - CSV 数据源实现
// ==========================================
// 职责: CSV 文件 → 行游标；列名与字段模式匹配
// 列名匹配: 默认忽略大小写/空白/重音，可切换为精确匹配
// ==========================================

use crate::domain::field::FieldSchema;
use crate::domain::options::ImportOptions;
use crate::domain::row::{CellValue, Row};
use crate::error::{ImportError, ImportResult};
use crate::source::RowSource;
use crate::utils;
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV 数据源配置
#[derive(Debug, Clone)]
pub struct CsvSourceOptions {
    /// 字段分隔符
    pub separator: u8,
    /// 列名是否精确匹配（false 时忽略大小写/空白/重音）
    pub exact_column_name: bool,
}

impl Default for CsvSourceOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            exact_column_name: false,
        }
    }
}

// ==========================================
// CsvRowSource - CSV 文件数据源
// ==========================================
pub struct CsvRowSource {
    file_path: PathBuf,
    schema: FieldSchema,
    options: CsvSourceOptions,

    // init_and_check 之后填充
    // 模式字段 → CSV 列下标（按模式声明顺序；列缺失且非必填时为 None）
    column_index: Vec<(String, Option<usize>)>,
    header_count: usize,
    records: Vec<Vec<String>>,
    cursor: usize,
    is_valid: bool,
    inited: bool,
}

impl CsvRowSource {
    /// 创建 CSV 数据源（不做 IO；文件在 init_and_check 时读取）
    pub fn new(file_path: impl AsRef<Path>, schema: FieldSchema, options: CsvSourceOptions) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            schema,
            options,
            column_index: Vec::new(),
            header_count: 0,
            records: Vec::new(),
            cursor: 0,
            is_valid: false,
            inited: false,
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults(file_path: impl AsRef<Path>, schema: FieldSchema) -> Self {
        Self::new(file_path, schema, CsvSourceOptions::default())
    }

    fn load_file(&mut self) -> ImportResult<()> {
        let path_display = self.file_path.display().to_string();

        if !self.file_path.is_file() {
            return Err(ImportError::CannotOpenCsvFile(path_display));
        }

        // 整体读取并做编码检查（仅支持 UTF-8）
        let bytes = std::fs::read(&self.file_path)
            .map_err(|_| ImportError::CannotOpenCsvFile(path_display.clone()))?;
        let content = String::from_utf8(bytes).map_err(|_| ImportError::WrongEncoding {
            file: path_display.clone(),
            expected: "utf-8".to_string(),
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.options.separator)
            .flexible(true) // 行长度不一致延迟到逐行读取时报告
            .from_reader(content.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::NoColumnsDefined(path_display));
        }
        self.header_count = headers.len();

        // 读取所有数据行，跳过完全空白的行
        self.records.clear();
        for result in reader.records() {
            let record = result?;
            let values: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
            if values.iter().all(|v| v.is_empty()) {
                continue;
            }
            self.records.push(values);
        }

        // 模式字段与 CSV 列匹配；必填字段缺列是致命配置错误
        self.column_index.clear();
        for def in self.schema.fields() {
            let found = headers.iter().position(|header| {
                if self.options.exact_column_name {
                    def.name == *header
                } else {
                    utils::equals_ws_accents(&def.name, header)
                }
            });
            if found.is_none() && def.required {
                return Err(ImportError::ColumnMissing(def.name.clone()));
            }
            self.column_index.push((def.name.clone(), found));
        }

        debug!(
            file = %path_display,
            rows = self.records.len(),
            columns = self.header_count,
            "CSV 数据源加载完成"
        );
        Ok(())
    }
}

impl RowSource for CsvRowSource {
    fn fields_definition(&self) -> &FieldSchema {
        &self.schema
    }

    fn init_and_check(&mut self, _options: &ImportOptions) -> ImportResult<()> {
        self.load_file()?;
        self.inited = true;
        self.rewind()
    }

    fn rewind(&mut self) -> ImportResult<()> {
        self.cursor = 0;
        self.is_valid = !self.records.is_empty();
        Ok(())
    }

    fn current(&self) -> ImportResult<Row> {
        let record = self
            .records
            .get(self.cursor)
            .ok_or_else(|| ImportError::InternalError("读取已耗尽的数据源".to_string()))?;

        // 列数必须与表头一致，否则作为行级解码错误抛出
        if record.len() != self.header_count {
            return Err(ImportError::WrongColumnNumber {
                row: self.cursor,
                expected: self.header_count,
                actual: record.len(),
            });
        }

        // 仅保留模式声明的字段，多余列丢弃；缺失列的字段不写入行
        let mut row = Row::new();
        for (field, index) in &self.column_index {
            if let Some(index) = index {
                if let Some(value) = record.get(*index) {
                    row.set(field.clone(), CellValue::Text(value.clone()));
                }
            }
        }
        Ok(row)
    }

    fn advance(&mut self) -> ImportResult<()> {
        self.cursor += 1;
        if self.cursor >= self.records.len() {
            self.is_valid = false;
        }
        Ok(())
    }

    fn valid(&self) -> bool {
        self.inited && self.is_valid
    }

    fn key(&self) -> usize {
        self.cursor
    }

    fn total_row_count(&self) -> usize {
        self.records.len()
    }

    fn source_type(&self) -> &str {
        "file"
    }

    fn source_identifier(&self) -> &str {
        self.file_path.to_str().unwrap_or("unknown")
    }
}
