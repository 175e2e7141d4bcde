use pretty_assertions::assert_eq;
use sql_review::{
    advisor::{
        Advisor, NoSelectAll, Registry, RegistryBuilder, RuleConfig, RuleLevel, RuleType, Status,
        WhereRequire
    },
    error::ReviewError,
    parser::{Engine, parse}
};

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut builder = RegistryBuilder::new();
    builder
        .register(Engine::Postgres, RuleType::StatementNoSelectAll, NoSelectAll)
        .unwrap();
    let result = builder.register(Engine::Postgres, RuleType::StatementNoSelectAll, NoSelectAll);
    assert_eq!(result.err(), Some(ReviewError::DuplicateAdvisor {
        engine: Engine::Postgres,
        rule:   RuleType::StatementNoSelectAll
    }));
}

#[test]
fn test_same_rule_for_two_engines() {
    let mut builder = RegistryBuilder::new();
    builder
        .register(Engine::MySql, RuleType::StatementRequireWhere, WhereRequire)
        .unwrap()
        .register(Engine::Postgres, RuleType::StatementRequireWhere, WhereRequire)
        .unwrap();
    let registry = builder.build();
    assert_eq!(registry.len(), 2);
    assert!(
        registry
            .advisor(Engine::MySql, RuleType::StatementRequireWhere)
            .is_ok()
    );
    assert!(
        registry
            .advisor(Engine::MySql, RuleType::StatementNoSelectAll)
            .is_err()
    );
}

#[test]
fn test_builtin_catalog() {
    let registry = Registry::builtin().unwrap();
    assert_eq!(registry.len(), 13);
    let postgres: Vec<RuleType> = registry
        .entries()
        .filter(|(engine, _)| *engine == Engine::Postgres)
        .map(|(_, rule)| rule)
        .collect();
    assert_eq!(postgres.len(), 6);
    assert!(!postgres.contains(&RuleType::StatementDisallowCommit));
}

#[test]
fn test_default_rules_use_default_levels() {
    let registry = Registry::builtin().unwrap();
    for rule in registry.default_rules(Engine::MySql) {
        assert_eq!(rule.level, rule.rule_type.default_level());
        assert!(rule.payload.is_none());
    }
}

#[test]
fn test_review_keeps_configuration_order_and_skips_disabled() {
    let registry = Registry::builtin().unwrap();
    let statements = parse(Engine::MySql, "SELECT * FROM t;\nDELETE FROM t;").unwrap();
    let rules = [
        RuleConfig::new(RuleType::StatementRequireWhere, RuleLevel::Error),
        RuleConfig::new(RuleType::TableRequirePk, RuleLevel::Disabled),
        RuleConfig::new(RuleType::StatementNoSelectAll, RuleLevel::Warning),
        RuleConfig::new(RuleType::StatementDisallowCommit, RuleLevel::Error)
    ];
    let reports = registry.review(Engine::MySql, &statements, &rules).unwrap();
    let summary: Vec<(RuleType, Status)> = reports.iter().map(|r| (r.rule, r.status())).collect();
    assert_eq!(summary, [
        (RuleType::StatementRequireWhere, Status::Error),
        (RuleType::StatementNoSelectAll, Status::Warning),
        (RuleType::StatementDisallowCommit, Status::Success)
    ]);
    assert_eq!(reports[0].advice[0].line, 2);
}

#[test]
fn test_review_fails_on_unsupported_rule() {
    let registry = Registry::builtin().unwrap();
    let statements = parse(Engine::Postgres, "SELECT 1;").unwrap();
    let rules = [RuleConfig::new(
        RuleType::StatementDisallowCommit,
        RuleLevel::Warning
    )];
    assert!(matches!(
        registry.review(Engine::Postgres, &statements, &rules),
        Err(ReviewError::UnsupportedRule { .. })
    ));
}

#[test]
fn test_advisors_are_shareable() {
    fn assert_shareable<T: Send + Sync>() {}
    assert_shareable::<Registry>();
    assert_shareable::<Box<dyn Advisor>>();
}
