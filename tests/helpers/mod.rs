// ==========================================
// 集成测试辅助 - 内存数据源/导入器
// ==========================================
// 提供可注入故障的内存协作方，驱动处理器的各种路径
// ==========================================

#![allow(dead_code)]

use data_import_engine::{
    CellValue, FieldDefinition, FieldSchema, ImportError, ImportOptions, ImportResult,
    ImporterCore, Row, RowImporter, RowSource,
};

// ==========================================
// InMemoryRowSource - 内存数据源
// ==========================================
pub struct InMemoryRowSource {
    schema: FieldSchema,
    data: Vec<Vec<String>>,
    cursor: usize,
    is_valid: bool,
    inited: bool,
    /// 为 Some(i) 时，从第 i 行推进到下一行会报一次解码错误
    pub fail_advance_at: Option<usize>,
    /// 为 true 时 init_and_check 直接失败（模拟资源不可用）
    pub fail_init: bool,
}

impl InMemoryRowSource {
    pub fn new(schema: FieldSchema, data: Vec<Vec<&str>>) -> Self {
        Self {
            schema,
            data: data
                .into_iter()
                .map(|row| row.into_iter().map(String::from).collect())
                .collect(),
            cursor: 0,
            is_valid: false,
            inited: false,
            fail_advance_at: None,
            fail_init: false,
        }
    }

    /// 基础字段模式：col1..col4 全部为文本
    pub fn basic_schema() -> FieldSchema {
        FieldSchema::new(vec![
            FieldDefinition::text("col1"),
            FieldDefinition::text("col2"),
            FieldDefinition::text("col3"),
            FieldDefinition::text("col4"),
        ])
    }

    /// 基础数据：3 行 × 4 列
    pub fn basic() -> Self {
        Self::new(
            Self::basic_schema(),
            vec![
                vec!["A", "B", "C", "D"],
                vec!["E", "F", "G", "H"],
                vec!["I", "J", "K", "L"],
            ],
        )
    }
}

impl RowSource for InMemoryRowSource {
    fn fields_definition(&self) -> &FieldSchema {
        &self.schema
    }

    fn init_and_check(&mut self, _options: &ImportOptions) -> ImportResult<()> {
        if self.fail_init {
            return Err(ImportError::CannotOpenCsvFile("memory:test".to_string()));
        }
        self.inited = true;
        self.rewind()
    }

    fn rewind(&mut self) -> ImportResult<()> {
        self.cursor = 0;
        self.is_valid = !self.data.is_empty();
        Ok(())
    }

    fn current(&self) -> ImportResult<Row> {
        let record = self
            .data
            .get(self.cursor)
            .ok_or_else(|| ImportError::InternalError("读取已耗尽的数据源".to_string()))?;
        // 列数与模式不一致时抛出行级解码错误
        if record.len() != self.schema.len() {
            return Err(ImportError::WrongColumnNumber {
                row: self.cursor,
                expected: self.schema.len(),
                actual: record.len(),
            });
        }
        let mut row = Row::new();
        for (def, value) in self.schema.fields().iter().zip(record) {
            row.set(def.name.clone(), CellValue::Text(value.clone()));
        }
        Ok(row)
    }

    fn advance(&mut self) -> ImportResult<()> {
        let failing = self.fail_advance_at == Some(self.cursor);
        self.cursor += 1;
        if self.cursor >= self.data.len() {
            self.is_valid = false;
        }
        if failing {
            return Err(ImportError::CsvParse("模拟的解码失败".to_string()));
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
        self.data.len()
    }

    fn source_type(&self) -> &str {
        "memory"
    }

    fn source_identifier(&self) -> &str {
        "test"
    }
}

// ==========================================
// InMemoryRowImporter - 内存导入器
// ==========================================
pub struct InMemoryRowImporter {
    core: ImporterCore,
    schema: FieldSchema,
    /// 成功落库的行
    pub imported: Vec<Row>,
    /// 为 Some(i) 时，第 i 行落库失败（模拟后端故障）
    pub fail_on_row: Option<usize>,
}

impl InMemoryRowImporter {
    pub fn new(source_schema: FieldSchema, destination_schema: FieldSchema) -> Self {
        Self {
            core: ImporterCore::new(source_schema),
            schema: destination_schema,
            imported: Vec::new(),
            fail_on_row: None,
        }
    }

    /// 基础导入器：源 col1..col4，目标 newcol1 + col2..col4
    pub fn basic() -> Self {
        Self::new(
            InMemoryRowSource::basic_schema(),
            FieldSchema::new(vec![
                FieldDefinition::text("newcol1"),
                FieldDefinition::text("col2"),
                FieldDefinition::text("col3"),
                FieldDefinition::text("col4"),
            ]),
        )
    }
}

impl RowImporter for InMemoryRowImporter {
    fn core(&self) -> &ImporterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ImporterCore {
        &mut self.core
    }

    fn fields_definition(&self) -> &FieldSchema {
        &self.schema
    }

    fn import_row(
        &mut self,
        row: &Row,
        rowindex: usize,
        _options: &ImportOptions,
    ) -> ImportResult<()> {
        if self.fail_on_row == Some(rowindex) {
            return Err(ImportError::Persistence {
                row: rowindex,
                message: "模拟的后端写入失败".to_string(),
            });
        }
        self.imported.push(row.clone());
        Ok(())
    }
}

// ==========================================
// RecordingProgress - 记录式进度上报器
// ==========================================
use data_import_engine::ProgressReporter;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct RecordingProgress {
    pub updates: Arc<Mutex<Vec<(usize, usize)>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> Vec<(usize, usize)> {
        self.updates.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn update(&mut self, rows_processed: usize, total_rows: usize) {
        self.updates.lock().unwrap().push((rows_processed, total_rows));
    }
}
