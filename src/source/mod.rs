// ==========================================
// 通用数据导入引擎 - 数据源层
// ==========================================
// 职责: 行式数据的惰性、可重放游标协议
// ==========================================

pub mod csv_source;

pub use csv_source::{CsvRowSource, CsvSourceOptions};

use crate::domain::field::FieldSchema;
use crate::domain::options::ImportOptions;
use crate::domain::row::Row;
use crate::error::ImportResult;

// ==========================================
// RowSource Trait
// ==========================================
// 用途: 数据源主接口（游标协议）
// 实现者: CsvRowSource，以及测试用的内存数据源
pub trait RowSource {
    /// 源字段模式（转换前校验所用）
    fn fields_definition(&self) -> &FieldSchema;

    /// 初始化并检查数据源
    ///
    /// 此处的任何错误对整次运行都是致命的：资源不可读、编码不符、
    /// 必需列缺失等都应在这里暴露，而不是推迟到逐行读取。
    fn init_and_check(&mut self, options: &ImportOptions) -> ImportResult<()>;

    /// 回到第一行（空数据源则标记为失效）
    fn rewind(&mut self) -> ImportResult<()>;

    /// 读取当前行（每次调用产生全新的 Row）
    ///
    /// 行级解码错误（如列数不一致）从这里抛出，由处理器按行记录日志
    /// 并继续处理后续行。
    fn current(&self) -> ImportResult<Row>;

    /// 前进到下一行；越过末尾后 `valid()` 返回 false
    ///
    /// 行级解码错误允许从这里传播——对处理器而言这是可恢复的
    /// 行级事件，而非流级致命错误。
    fn advance(&mut self) -> ImportResult<()>;

    /// 当前游标是否指向有效行
    fn valid(&self) -> bool;

    /// 当前行号（0 起）
    fn key(&self) -> usize;

    /// 数据行总数（不含表头）
    fn total_row_count(&self) -> usize;

    /// 数据源类型，如 "file"、"memory"
    fn source_type(&self) -> &str;

    /// 数据源标识，如文件路径
    fn source_identifier(&self) -> &str;

    /// 稳定的来源标识，写入日志 origin 字段
    fn origin(&self) -> String {
        format!("{}:{}", self.source_type(), self.source_identifier())
    }
}
