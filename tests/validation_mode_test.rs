// ==========================================
// 校验（试运行）模式集成测试
// ==========================================
// 测试目标: 不落库、清除历史校验日志、运行后可重放
// ==========================================

mod helpers;

use chrono::Utc;
use data_import_engine::{
    logging, BasicImportLogger, FieldDefinition, FieldSchema, ImportLogEntry, ImportLogger,
    ImportOptions, LogFilter, LogLevel, Processor, StandardTransformer, TransformRule,
};
use helpers::{InMemoryRowImporter, InMemoryRowSource};
use std::collections::HashMap;

fn rename_transformer() -> StandardTransformer {
    let mut rules = HashMap::new();
    rules.insert("col1".to_string(), vec![TransformRule::to_field("newcol1")]);
    StandardTransformer::new(rules)
}

fn seed_entry(importid: i64, validationstep: bool) -> ImportLogEntry {
    ImportLogEntry {
        id: None,
        linenumber: 2,
        messagecode: "required".to_string(),
        module: "import_engine".to_string(),
        additionalinfo: serde_json::Value::Null,
        fieldname: "fullname".to_string(),
        level: LogLevel::Warning,
        origin: "memory:test".to_string(),
        importid,
        validationstep,
        timecreated: Utc::now(),
    }
}

#[test]
fn test_validate_never_persists() {
    logging::init_test();
    let mut processor = Processor::new(
        InMemoryRowSource::basic(),
        rename_transformer(),
        InMemoryRowImporter::basic(),
        Box::new(BasicImportLogger::new()),
    );

    assert!(processor.validate(&ImportOptions::default()));
    assert!(processor.importer().imported.is_empty());
    assert_eq!(processor.row_imported_count(), 0);
}

#[test]
fn test_validate_purges_prior_validation_logs_only() {
    logging::init_test();
    let logger = BasicImportLogger::new();
    // 历史日志：会话 7 的校验日志与导入日志，另一个会话 8 的校验日志
    logger.log(seed_entry(7, true)).unwrap();
    logger.log(seed_entry(7, false)).unwrap();
    logger.log(seed_entry(8, true)).unwrap();

    let mut processor = Processor::new(
        InMemoryRowSource::basic(),
        rename_transformer(),
        InMemoryRowImporter::basic(),
        Box::new(logger),
    );
    processor.set_import_id(7);

    assert!(processor.validate(&ImportOptions::default()));

    // 会话 7 的校验日志被清除；其导入日志与会话 8 的校验日志原样保留
    assert!(processor.get_validation_logs().unwrap().is_empty());
    assert_eq!(
        processor
            .logger()
            .get_logs(&LogFilter::for_import(7))
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        processor
            .logger()
            .get_logs(&LogFilter::validation_step(8))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_validate_then_import_reprocesses_all_rows() {
    logging::init_test();
    let mut processor = Processor::new(
        InMemoryRowSource::basic(),
        rename_transformer(),
        InMemoryRowImporter::basic(),
        Box::new(BasicImportLogger::new()),
    );

    // 校验完成后数据源被重置，随后的导入从头处理全部行
    assert!(processor.validate(&ImportOptions::default()));
    assert!(processor.import(&ImportOptions::default()));
    assert_eq!(processor.importer().imported.len(), 3);
    assert_eq!(processor.row_imported_count(), 3);
}

#[test]
fn test_validation_logs_tagged_with_validationstep() {
    logging::init_test();
    // 目标模式要求一个必然缺失的字段 → 每行一条 Warning
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
    processor.set_import_id(3);

    assert!(processor.validate(&ImportOptions::default()));
    let validation_logs = processor.get_validation_logs().unwrap();
    assert_eq!(validation_logs.len(), 3);
    assert!(validation_logs.iter().all(|log| log.validationstep));

    // 随后的导入产生的日志不带 validationstep 标记
    assert!(processor.import(&ImportOptions::default()));
    let import_logs = processor
        .logger()
        .get_logs(&LogFilter {
            importid: Some(3),
            validationstep: Some(false),
        })
        .unwrap();
    assert_eq!(import_logs.len(), 3);
}

#[test]
fn test_repeated_validate_does_not_accumulate_logs() {
    logging::init_test();
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

    assert!(processor.validate(&ImportOptions::default()));
    assert!(processor.validate(&ImportOptions::default()));

    // 第二次校验前清除了第一次的校验日志
    assert_eq!(processor.get_validation_logs().unwrap().len(), 3);
}

#[test]
fn test_validate_fatal_init_error_is_logged_as_validation_entry() {
    logging::init_test();
    let mut source = InMemoryRowSource::basic();
    source.fail_init = true;
    let mut processor = Processor::new(
        source,
        rename_transformer(),
        InMemoryRowImporter::basic(),
        Box::new(BasicImportLogger::new()),
    );

    assert!(!processor.validate(&ImportOptions::default()));
    let logs = processor.get_validation_logs().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].linenumber, 0);
    assert!(logs[0].validationstep);
    assert!(logs[0].is_error());
}
