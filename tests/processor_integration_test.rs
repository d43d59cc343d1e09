// ==========================================
// 处理器集成测试
// ==========================================
// 测试目标: 验证逐行主循环的成功/失败/恢复路径
// ==========================================

mod helpers;

use data_import_engine::{
    logging, BasicImportLogger, CellValue, FieldDefinition, FieldSchema, ImportOptions, LogFilter,
    LogLevel, Processor, RowImporter, StandardTransformer, TransformRule,
};
use helpers::{InMemoryRowImporter, InMemoryRowSource, RecordingProgress};
use std::collections::HashMap;

/// col1 → newcol1 的重命名转换器
fn rename_transformer() -> StandardTransformer {
    let mut rules = HashMap::new();
    rules.insert("col1".to_string(), vec![TransformRule::to_field("newcol1")]);
    StandardTransformer::new(rules)
}

fn basic_processor() -> Processor<InMemoryRowSource, StandardTransformer, InMemoryRowImporter> {
    Processor::new(
        InMemoryRowSource::basic(),
        rename_transformer(),
        InMemoryRowImporter::basic(),
        Box::new(BasicImportLogger::new()),
    )
}

#[test]
fn test_import_basic() {
    logging::init_test();
    let mut processor = basic_processor();

    assert!(processor.import(&ImportOptions::default()));

    // 三行全部落库，且 col1 被重命名为 newcol1
    let imported = &processor.importer().imported;
    assert_eq!(imported.len(), 3);
    assert_eq!(
        imported[0].get("newcol1"),
        Some(&CellValue::Text("A".into()))
    );
    assert_eq!(imported[0].get("col2"), Some(&CellValue::Text("B".into())));
    assert!(!imported[0].contains("col1"));
    assert_eq!(
        imported[2].get("newcol1"),
        Some(&CellValue::Text("I".into()))
    );

    assert_eq!(processor.row_imported_count(), 3);
    assert_eq!(processor.total_row_count(), 3);
    // 无任何日志
    assert!(processor
        .logger()
        .get_logs(&LogFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_import_continues_after_decode_failure() {
    logging::init_test();
    // 第二行列数不足：读取时报行级错误
    let source = InMemoryRowSource::new(
        InMemoryRowSource::basic_schema(),
        vec![
            vec!["A", "B", "C", "D"],
            vec!["E", "F"],
            vec!["I", "J", "K", "L"],
        ],
    );
    let mut processor = Processor::new(
        source,
        rename_transformer(),
        InMemoryRowImporter::basic(),
        Box::new(BasicImportLogger::new()),
    );

    // Error 级日志 → 整体失败，但其余两行照常导入
    assert!(!processor.import(&ImportOptions::default()));
    assert_eq!(processor.importer().imported.len(), 2);
    assert_eq!(processor.row_imported_count(), 2);

    let logs = processor.logger().get_logs(&LogFilter::default()).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].linenumber, 1);
    assert_eq!(logs[0].messagecode, "wrongcolumnnumber");
    assert_eq!(logs[0].level, LogLevel::Error);
    assert_eq!(logs[0].origin, "memory:test");
    assert!(!logs[0].validationstep);
}

#[test]
fn test_import_continues_after_advance_failure() {
    logging::init_test();
    let mut source = InMemoryRowSource::basic();
    source.fail_advance_at = Some(0);
    let mut processor = Processor::new(
        source,
        rename_transformer(),
        InMemoryRowImporter::basic(),
        Box::new(BasicImportLogger::new()),
    );

    // 推进错误是行级事件：记一条日志，循环继续
    assert!(!processor.import(&ImportOptions::default()));
    assert_eq!(processor.importer().imported.len(), 3);

    let logs = processor.logger().get_logs(&LogFilter::default()).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].messagecode, "csvparseerror");
    assert_eq!(logs[0].linenumber, 1);
}

#[test]
fn test_persistence_failure_is_row_scoped() {
    logging::init_test();
    let mut importer = InMemoryRowImporter::basic();
    importer.fail_on_row = Some(1);
    let mut processor = Processor::new(
        InMemoryRowSource::basic(),
        rename_transformer(),
        importer,
        Box::new(BasicImportLogger::new()),
    );

    assert!(!processor.import(&ImportOptions::default()));
    assert_eq!(processor.importer().imported.len(), 2);
    assert_eq!(processor.row_imported_count(), 2);

    let logs = processor.logger().get_logs(&LogFilter::default()).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].messagecode, "rowimportfailed");
    assert_eq!(logs[0].linenumber, 1);
}

#[test]
fn test_missing_required_field_is_warning_not_run_failure() {
    logging::init_test();
    // 目标模式要求一个转换后必然缺失的字段
    let importer = InMemoryRowImporter::new(
        InMemoryRowSource::basic_schema(),
        FieldSchema::new(vec![FieldDefinition::text("missingcol").required()]),
    );
    let mut processor = Processor::new(
        InMemoryRowSource::basic(),
        rename_transformer(),
        importer,
        Box::new(BasicImportLogger::new()),
    );

    // 校验失败是 Warning 级：不判整体失败，但行不落库、不计数
    assert!(processor.import(&ImportOptions::default()));
    assert!(processor.importer().imported.is_empty());
    assert_eq!(processor.row_imported_count(), 0);

    let logs = processor.logger().get_logs(&LogFilter::default()).unwrap();
    assert_eq!(logs.len(), 3);
    for (index, log) in logs.iter().enumerate() {
        assert_eq!(log.messagecode, "required");
        assert_eq!(log.fieldname, "missingcol");
        assert_eq!(log.level, LogLevel::Warning);
        assert_eq!(log.linenumber, index);
    }
}

#[test]
fn test_wrong_type_reports_field_name() {
    logging::init_test();
    // 目标模式要求 col2 为整数，而数据是字母
    let importer = InMemoryRowImporter::new(
        InMemoryRowSource::basic_schema(),
        FieldSchema::new(vec![
            FieldDefinition::text("newcol1"),
            FieldDefinition::int("col2"),
        ]),
    );
    let mut processor = Processor::new(
        InMemoryRowSource::basic(),
        rename_transformer(),
        importer,
        Box::new(BasicImportLogger::new()),
    );

    assert!(processor.import(&ImportOptions::default()));
    assert!(processor.importer().imported.is_empty());

    let logs = processor.logger().get_logs(&LogFilter::default()).unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].messagecode, "wrongtype");
    assert_eq!(logs[0].fieldname, "col2");
}

#[test]
fn test_init_failure_aborts_run_before_any_row() {
    logging::init_test();
    let mut source = InMemoryRowSource::basic();
    source.fail_init = true;
    let mut processor = Processor::new(
        source,
        rename_transformer(),
        InMemoryRowImporter::basic(),
        Box::new(BasicImportLogger::new()),
    );

    assert!(!processor.import(&ImportOptions::default()));
    assert!(processor.importer().imported.is_empty());
    assert_eq!(processor.row_imported_count(), 0);

    let logs = processor.logger().get_logs(&LogFilter::default()).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].linenumber, 0);
    assert_eq!(logs[0].level, LogLevel::Error);
}

#[test]
fn test_untyped_destination_schema_is_fatal_config_defect() {
    logging::init_test();
    let importer = InMemoryRowImporter::new(
        InMemoryRowSource::basic_schema(),
        FieldSchema::new(vec![FieldDefinition::untyped("broken")]),
    );
    let mut processor = Processor::new(
        InMemoryRowSource::basic(),
        rename_transformer(),
        importer,
        Box::new(BasicImportLogger::new()),
    );

    // 配置缺陷在 init 阶段暴露：不处理任何行
    assert!(!processor.import(&ImportOptions::default()));
    assert!(processor.importer().imported.is_empty());

    let logs = processor.logger().get_logs(&LogFilter::default()).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].messagecode, "importercolumndef");
    assert_eq!(logs[0].linenumber, 0);
}

#[test]
fn test_progress_reported_after_each_row_in_import_mode() {
    logging::init_test();
    let mut processor = basic_processor();
    let progress = RecordingProgress::new();
    processor.add_progress_reporter(Box::new(progress.clone()));

    assert!(processor.import(&ImportOptions::default()));
    assert_eq!(progress.seen(), vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn test_progress_silent_in_validation_mode() {
    logging::init_test();
    let mut processor = basic_processor();
    let progress = RecordingProgress::new();
    processor.add_progress_reporter(Box::new(progress.clone()));

    assert!(processor.validate(&ImportOptions::default()));
    assert!(progress.seen().is_empty());
}

#[test]
fn test_import_id_threaded_to_collaborators() {
    let mut processor = basic_processor();
    processor.set_import_id(50);
    assert_eq!(processor.import_id(), 50);
    assert_eq!(processor.importer().import_id(), 50);
}

#[test]
fn test_empty_source_import_succeeds() {
    logging::init_test();
    let source = InMemoryRowSource::new(InMemoryRowSource::basic_schema(), vec![]);
    let mut processor = Processor::new(
        source,
        rename_transformer(),
        InMemoryRowImporter::basic(),
        Box::new(BasicImportLogger::new()),
    );

    assert!(processor.import(&ImportOptions::default()));
    assert_eq!(processor.row_imported_count(), 0);
    assert!(processor
        .logger()
        .get_logs(&LogFilter::default())
        .unwrap()
        .is_empty());
}
