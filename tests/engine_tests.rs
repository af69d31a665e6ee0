//! Integration tests exercising the full load/normalize/match flow
//! through the public API.

use sigscan::{
    Category, Engine, EngineConfig, FieldEvent, LoadError, Normalizer, QueryError, RuleSource,
    ScanOrder,
};

/// One complete rule record in document order.
fn record(tag: &str, impact: &str, rule: &str, description: &str) -> Vec<FieldEvent> {
    vec![
        FieldEvent::new("tag", tag),
        FieldEvent::new("impact", impact),
        FieldEvent::new("rule", rule),
        FieldEvent::new("description", description),
        FieldEvent::new("filter", ""),
    ]
}

/// A small but representative catalog covering several categories.
fn sample_document() -> Vec<FieldEvent> {
    let mut fields = record("xss", "4", "<script", "script tag injection");
    fields.extend(record("sqli", "5", r"union\s+select", "classic UAC"));
    fields.extend(record("sqli", "3", r"=0", "null comparison probe"));
    fields.extend(record("dt", "2", r"\.\./", "parent directory escape"));
    fields
}

fn engine_with(fields: Vec<FieldEvent>, scan_order: ScanOrder) -> Engine {
    let mut engine = Engine::new(EngineConfig {
        scan_order,
        ..Default::default()
    });
    engine.load(fields).expect("catalog should load");
    engine
}

fn sample_engine() -> Engine {
    engine_with(sample_document(), ScanOrder::default())
}

#[test]
fn rules_sorted_by_priority_key_under_every_scan_order() {
    for scan_order in [
        ScanOrder::ImpactAscending,
        ScanOrder::ImpactDescending,
        ScanOrder::Document,
    ] {
        let engine = engine_with(sample_document(), scan_order);
        let rules = engine.rules().unwrap();
        assert_eq!(rules.len(), 4);
        assert!(
            rules.windows(2).all(|w| w[0].priority_key <= w[1].priority_key),
            "rules not sorted under {scan_order:?}"
        );
    }
}

#[test]
fn match_first_agrees_with_match_all() {
    let engine = sample_engine();
    for input in [
        "1 UNION SELECT password FROM users",
        "<script>alert(1)</script>",
        "../../etc/passwd",
        "completely harmless",
        "col IS NULL",
    ] {
        let first = engine.match_first(input).unwrap();
        let all = engine.match_all(input).unwrap();
        match first {
            Some(rule) => {
                assert_eq!(rule.fingerprint, all[0].fingerprint, "input {input:?}");
            }
            None => assert!(all.is_empty(), "input {input:?}"),
        }
    }
}

#[test]
fn match_by_tag_is_a_tagged_subset_of_match_all() {
    let engine = sample_engine();
    let input = "<script>1 union select x where y=0</script>";
    let all = engine.match_all(input).unwrap();
    for category in Category::ALL {
        let tagged = engine.match_by_tag(input, category.name()).unwrap();
        for rule in &tagged {
            assert!(rule.has_tag(category));
            assert!(all.iter().any(|r| r.fingerprint == rule.fingerprint));
        }
    }
    assert!(engine.match_by_tag(input, "Not A Category").unwrap().is_empty());
}

#[test]
fn match_by_tag_preserves_scan_order() {
    let engine = sample_engine();
    let input = "union select a where b=0";
    let sqli = engine.match_by_tag(input, "SQL Injection").unwrap();
    assert_eq!(sqli.len(), 2);
    // Impact-ascending default: the impact-3 probe precedes the impact-5 rule.
    assert_eq!(sqli[0].impact, 3);
    assert_eq!(sqli[1].impact, 5);
}

#[test]
fn prefilter_classifies_benign_and_suspicious_inputs() {
    let engine = sample_engine();
    assert!(!engine.should_scan("admin123"));
    assert!(!engine.should_scan("/index.html"));
    assert!(engine.should_scan("/search?q=<script>"));
}

#[test]
fn round_trip_sqli_rule() {
    let engine = sample_engine();
    let hit = engine
        .match_first("1 UNION SELECT password FROM users")
        .unwrap()
        .expect("signature should match");
    assert_eq!(hit.impact, 5);
    assert_eq!(hit.description, "classic UAC");
    assert!(hit.has_tag(Category::SqlInjection));
    assert_eq!(hit.to_string(), "5,union\\s+select|classic UAC");
}

#[test]
fn invalid_records_never_load() {
    let mut fields = record("sqli", "0", "select", "impact zero");
    fields.extend(record("sqli", "5", "", "empty rule"));
    fields.extend(record("nope", "5", "select", "unknown tag only"));
    fields.extend(record("sqli", "5", "select", ""));
    fields.extend(record("sqli", "5", "valid", "kept"));
    let engine = engine_with(fields, ScanOrder::default());
    let rules = engine.rules().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].description, "kept");
}

#[test]
fn escaped_markup_is_matched_after_normalization() {
    let engine = sample_engine();
    let hit = engine.match_first("\\x3Cscript\\x3E").unwrap();
    assert_eq!(hit.map(|rule| rule.impact), Some(4));
}

#[test]
fn sql_null_idiom_is_matched_after_folding() {
    let engine = sample_engine();
    let hits = engine.match_all("col IS NULL").unwrap();
    assert!(hits.iter().any(|rule| rule.pattern_str == "=0"));
}

#[test]
fn normalizer_is_idempotent_on_canonical_text() {
    let normalizer = Normalizer::new();
    let canonical = "/path/to/page.html?key=value 42";
    let once = normalizer.apply(canonical);
    let twice = normalizer.apply(&once);
    assert_eq!(once, twice);
}

#[test]
fn fields_roll_forward_across_filter_boundaries() {
    let fields = vec![
        FieldEvent::new("tag", "sqli"),
        FieldEvent::new("impact", "7"),
        FieldEvent::new("rule", "first"),
        FieldEvent::new("description", "inherited"),
        FieldEvent::new("filter", ""),
        FieldEvent::new("tag", "xss"),
        FieldEvent::new("rule", "second"),
        FieldEvent::new("filter", ""),
    ];
    let engine = engine_with(fields, ScanOrder::Document);
    let rules = engine.rules().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[1].pattern_str, "second");
    assert_eq!(rules[1].description, "inherited");
    assert_eq!(rules[1].impact, 7);
    assert_eq!(rules[1].tags, vec![Category::Xss]);
}

#[test]
fn pattern_compile_failure_fails_the_load() {
    let mut engine = Engine::default();
    let err = engine.load(record("sqli", "5", "([", "broken")).unwrap_err();
    assert!(matches!(err, LoadError::Pattern { .. }));
    assert!(!engine.is_loaded());
    assert!(engine.load_failed());
}

#[test]
fn unreadable_document_leaves_engine_unusable() {
    struct Unreadable;
    impl RuleSource for Unreadable {
        fn read_fields(&mut self) -> anyhow::Result<Vec<FieldEvent>> {
            anyhow::bail!("document parse failed")
        }
    }

    let mut engine = Engine::default();
    assert!(matches!(
        engine.load(Unreadable),
        Err(LoadError::Document(_))
    ));
    assert!(engine.load_failed());
    assert_eq!(
        engine.match_first("anything").unwrap_err(),
        QueryError::NotLoaded
    );
}

#[test]
fn queries_run_concurrently_on_a_shared_engine() {
    let engine = sample_engine();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let hit = engine.match_first("1 union select x").unwrap();
                    assert!(hit.is_some());
                    assert_eq!(engine.match_all("benign words").unwrap().len(), 0);
                }
            });
        }
    });
}

#[test]
fn impact_descending_scans_severe_rules_first() {
    let engine = engine_with(sample_document(), ScanOrder::ImpactDescending);
    let input = "union select a where b=0";
    let hits = engine.match_all(input).unwrap();
    assert_eq!(hits[0].impact, 5);
    assert!(hits.windows(2).all(|w| w[0].impact >= w[1].impact));
}
