use sniffer_checker::{
    check_parallel, ClassUnit, CompatibilityChecker, IgnoreRuleSet, MalformedClassPolicy,
    ReferenceExtractor,
};
use sniffer_test_utils::{ClassFileBuilder, MethodBuilder};

use super::list_baseline;

fn units() -> Vec<ClassUnit> {
    (0..40)
        .map(|i| {
            let name = format!("com/example/C{i:02}");
            let method = match i % 4 {
                0 => MethodBuilder::new("run", "()V").invoke_interface("java/util/List", "size", "()I"),
                1 => MethodBuilder::new("run", "()V").new_object(&format!("com/missing/M{}", i % 3)),
                2 => MethodBuilder::new("run", "()V").invoke_interface(
                    "java/util/List",
                    "get",
                    "(I)Ljava/lang/Object;",
                ),
                _ => MethodBuilder::new("run", "()V").checkcast("java/lang/Object"),
            };
            let bytes = ClassFileBuilder::new(&name).method(method).build();
            ClassUnit::new(format!("{name}.class"), bytes)
        })
        .collect()
}

#[test]
fn parallel_outcome_matches_sequential_run() {
    let index = list_baseline();
    let ignores = IgnoreRuleSet::build(["com.missing.M2"]).unwrap();
    let extractor = ReferenceExtractor::default();

    let mut checker = CompatibilityChecker::new(&index, &ignores);
    for unit in units() {
        checker.check_class_bytes(&unit.name, &unit.bytes).unwrap();
    }
    let sequential = checker.into_outcome();

    let parallel = check_parallel(
        &index,
        &ignores,
        &extractor,
        units(),
        MalformedClassPolicy::Halt,
    )
    .unwrap();

    assert!(sequential.is_signature_broken());
    assert_eq!(parallel, sequential);
}

#[test]
fn clean_units_stay_clean_in_parallel() {
    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let units: Vec<_> = units()
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % 4 == 0 || i % 4 == 3)
        .map(|(_, unit)| unit)
        .collect();

    let outcome = check_parallel(
        &index,
        &ignores,
        &ReferenceExtractor::default(),
        units,
        MalformedClassPolicy::Halt,
    )
    .unwrap();
    assert!(!outcome.is_signature_broken());
    assert!(outcome.findings.is_empty());
}

#[test]
fn halt_reports_the_earliest_malformed_class() {
    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let mut units = units();
    units[7].bytes.truncate(12);
    units[31].bytes.truncate(12);

    let err = check_parallel(
        &index,
        &ignores,
        &ReferenceExtractor::default(),
        units,
        MalformedClassPolicy::Halt,
    )
    .unwrap_err();
    assert_eq!(err.class, "com/example/C07.class");
}

#[test]
fn continue_collects_every_malformed_class() {
    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let mut units = units();
    units[7].bytes.truncate(12);
    units[31].bytes.truncate(12);

    let mut outcome = check_parallel(
        &index,
        &ignores,
        &ReferenceExtractor::default(),
        units,
        MalformedClassPolicy::Continue,
    )
    .unwrap();
    outcome.malformed_classes.sort();
    assert_eq!(
        outcome.malformed_classes,
        vec!["com/example/C07.class", "com/example/C31.class"]
    );
    assert!(outcome.is_signature_broken());
}
