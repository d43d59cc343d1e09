// ==========================================
// 通用数据导入引擎 - 导入处理器（编排层）
// ==========================================
// 职责: 驱动 数据源 → 转换 → 校验 → 落库 的逐行主循环
// 失败语义: 行级失败记日志后继续；初始化失败整次运行终止
// 模式: import（落库）/ validate（试运行，不落库）
// ==========================================

use crate::domain::log::{ImportLogEntry, LogFilter};
use crate::domain::options::ImportOptions;
use crate::error::{ImportError, ImportResult};
use crate::importer::row_importer::RowImporter;
use crate::logs::{ImportLogger, LogContext};
use crate::progress::ProgressReporter;
use crate::source::RowSource;
use crate::transformer::RowTransformer;
use crate::DEFAULT_MODULE;
use tracing::{debug, error, info};

// ==========================================
// Processor - 导入处理器
// ==========================================
pub struct Processor<S, T, I>
where
    S: RowSource,
    T: RowTransformer,
    I: RowImporter,
{
    source: S,
    transformer: T,
    importer: I,

    // 日志汇显式注入，不使用进程级单例
    logger: Box<dyn ImportLogger>,

    // 进度上报（可零个、一个或多个）
    progress: Vec<Box<dyn ProgressReporter>>,

    module: String,
    import_id: i64,
    /// 成功落库的行数（仅导入模式下累计）
    row_imported: usize,
}

impl<S, T, I> Processor<S, T, I>
where
    S: RowSource,
    T: RowTransformer,
    I: RowImporter,
{
    /// 创建处理器并接线各协作方
    pub fn new(source: S, transformer: T, importer: I, logger: Box<dyn ImportLogger>) -> Self {
        let mut processor = Self {
            source,
            transformer,
            importer,
            logger,
            progress: Vec::new(),
            module: DEFAULT_MODULE.to_string(),
            import_id: 0,
            row_imported: 0,
        };
        // 会话标识贯穿导入器与转换器
        processor.set_import_id(0);
        processor
    }

    /// 设置导入会话标识（贯穿导入器与转换器）
    pub fn set_import_id(&mut self, import_id: i64) {
        self.import_id = import_id;
        self.importer.set_import_id(import_id);
        self.transformer.set_import_id(import_id);
    }

    pub fn import_id(&self) -> i64 {
        self.import_id
    }

    pub fn set_module(&mut self, module: impl Into<String>) {
        self.module = module.into();
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// 挂接一个进度上报器
    pub fn add_progress_reporter(&mut self, reporter: Box<dyn ProgressReporter>) {
        self.progress.push(reporter);
    }

    // ===== 入口 =====

    /// 导入整个数据集
    ///
    /// 返回 true 表示本次运行未产生任何 Error 级日志。
    pub fn import(&mut self, options: &ImportOptions) -> bool {
        self.importer.set_import_mode();
        info!(import_id = self.import_id, origin = %self.source.origin(), "开始导入");
        let has_errors = self.do_import(options);
        info!(
            import_id = self.import_id,
            imported = self.row_imported,
            ok = !has_errors,
            "导入结束"
        );
        !has_errors
    }

    /// 校验整个数据集（试运行，绝不落库）
    ///
    /// 运行前清除同会话的历史校验日志；运行完成后把数据源重置到
    /// 起始位置，以便随后用同一数据源实例执行 import()。
    pub fn validate(&mut self, options: &ImportOptions) -> bool {
        let mut has_errors = false;

        if let Err(e) = self.purge_validation_logs() {
            self.importer.set_validation_mode();
            self.log_failure(&e, 0, &mut has_errors);
            return false;
        }

        self.importer.set_validation_mode();
        info!(import_id = self.import_id, origin = %self.source.origin(), "开始校验（试运行）");
        has_errors = self.do_import(options);

        if let Err(e) = self.source.rewind() {
            self.log_failure(&e, 0, &mut has_errors);
        }
        info!(import_id = self.import_id, ok = !has_errors, "校验结束");
        !has_errors
    }

    // ===== 主循环 =====

    /// 真正的逐行处理流程；返回是否产生了 Error 级日志
    fn do_import(&mut self, options: &ImportOptions) -> bool {
        if self.importer.is_import_mode() {
            self.row_imported = 0;
        }
        let mut has_errors = false;
        let mut rowindex: usize = 0;

        // 初始化阶段：任何失败都致命——记一条行号 0 的日志后放弃整次运行
        if let Err(e) = self.init_run(options) {
            self.log_failure(&e, 0, &mut has_errors);
            return has_errors;
        }

        while self.source.valid() {
            match self.process_row(rowindex, options) {
                Ok(()) => {
                    if self.importer.is_import_mode() {
                        self.row_imported += 1;
                    }
                }
                Err(e) => self.log_failure(&e, rowindex, &mut has_errors),
            }

            // 行号与游标每轮恰好推进一次，无论成败；
            // advance 的行级错误走同一套记日志后继续的路径
            rowindex += 1;
            if let Err(e) = self.source.advance() {
                self.log_failure(&e, rowindex, &mut has_errors);
            }
            self.update_progress(rowindex);
        }
        has_errors
    }

    fn init_run(&mut self, options: &ImportOptions) -> ImportResult<()> {
        self.source.init_and_check(options)?;
        self.source.rewind()?;
        self.importer.init(options)
    }

    /// 单行生命周期：读取 → 清洗 → 校验 → 转换 → 校验 → 落库
    fn process_row(&mut self, rowindex: usize, options: &ImportOptions) -> ImportResult<()> {
        let mut row = self.source.current()?;
        self.importer.fix_before_transform(&mut row, rowindex, options)?;
        self.importer.validate_before_transform(&row, rowindex, options)?;
        let transformed = self.transformer.transform(&row, options)?;
        self.importer
            .validate_after_transform(&transformed, rowindex, options)?;
        // 校验模式绝不落库
        if self.importer.is_import_mode() {
            self.importer.import_row(&transformed, rowindex, options)?;
        }
        Ok(())
    }

    /// 把一次失败转换为日志条目；仅 Error 级计入整体结果
    fn log_failure(&mut self, err: &ImportError, rowindex: usize, has_errors: &mut bool) {
        debug!(row = rowindex, error = %err, "行处理失败");
        let ctx = LogContext {
            linenumber: rowindex,
            module: self.module.clone(),
            origin: self.source.origin(),
            importid: self.import_id,
            validationstep: !self.importer.is_import_mode(),
        };
        match self.logger.log_from_error(err, &ctx) {
            Ok(entry) => {
                if entry.is_error() {
                    *has_errors = true;
                }
            }
            Err(log_err) => {
                // 日志汇本身不可用：无法留痕，只能判整次运行失败
                error!(error = %log_err, "写入导入日志失败");
                *has_errors = true;
            }
        }
    }

    /// 进度上报（仅导入模式；上报器故障不影响结果）
    fn update_progress(&mut self, rows_processed: usize) {
        if !self.importer.is_import_mode() {
            return;
        }
        let total = self.source.total_row_count();
        for reporter in &mut self.progress {
            reporter.update(rows_processed, total);
        }
    }

    // ===== 日志查询 =====

    /// 清除本会话的全部校验日志
    pub fn purge_validation_logs(&self) -> ImportResult<()> {
        self.logger.purge_validation_logs(self.import_id)
    }

    /// 本会话的校验日志
    pub fn get_validation_logs(&self) -> ImportResult<Vec<ImportLogEntry>> {
        self.logger
            .get_logs(&LogFilter::validation_step(self.import_id))
    }

    // ===== 访问器 =====

    pub fn total_row_count(&self) -> usize {
        self.source.total_row_count()
    }

    /// 成功落库的行数（校验模式不计）
    pub fn row_imported_count(&self) -> usize {
        self.row_imported
    }

    pub fn logger(&self) -> &dyn ImportLogger {
        self.logger.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn importer(&self) -> &I {
        &self.importer
    }

    pub fn importer_mut(&mut self) -> &mut I {
        &mut self.importer
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }
}
