use sniffer_checker::{
    CompatibilityChecker, IgnoreRuleSet, ReferenceExtractor, ReferenceKind,
};
use sniffer_test_utils::{
    ClassFileBuilder, MethodBuilder, IGNORE_JRE_REQUIREMENT, LEGACY_IGNORE_JRE_REQUIREMENT,
};

use super::list_baseline;

const GET: (&str, &str, &str) = ("java/util/List", "get", "(I)Ljava/lang/Object;");

fn calls_get(method: &str) -> MethodBuilder {
    MethodBuilder::new(method, "(Ljava/util/List;)Ljava/lang/Object;").invoke_interface(
        GET.0, GET.1, GET.2,
    )
}

#[test]
fn suppression_is_scoped_to_the_annotated_method() {
    let bytes = ClassFileBuilder::new("com/example/Mixed")
        .method(calls_get("guarded").annotation(IGNORE_JRE_REQUIREMENT, false))
        .method(calls_get("unguarded"))
        .build();

    let references = ReferenceExtractor::default()
        .extract("Mixed.class", &bytes)
        .unwrap();
    let flags: Vec<_> = references.iter().map(|r| r.site_suppressed).collect();
    assert_eq!(flags, vec![true, false]);

    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let mut checker = CompatibilityChecker::new(&index, &ignores);
    checker.process_class("Mixed.class", references);
    assert!(checker.is_signature_broken());
    assert_eq!(checker.findings().len(), 1);
}

#[test]
fn only_suppressed_sites_leave_the_verdict_clean() {
    let bytes = ClassFileBuilder::new("com/example/Guarded")
        .method(calls_get("modern").annotation(IGNORE_JRE_REQUIREMENT, false))
        .method(calls_get("legacy").annotation(LEGACY_IGNORE_JRE_REQUIREMENT, true))
        .build();

    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let mut checker = CompatibilityChecker::new(&index, &ignores);
    checker.check_class_bytes("Guarded.class", &bytes).unwrap();

    assert!(!checker.is_signature_broken());
}

#[test]
fn class_level_marker_suppresses_every_method() {
    let bytes = ClassFileBuilder::new("com/example/Optional")
        .annotation(IGNORE_JRE_REQUIREMENT, false)
        .method(calls_get("a"))
        .method(MethodBuilder::new("b", "()V").new_object("java/util/ArrayList"))
        .build();

    let references = ReferenceExtractor::default()
        .extract("Optional.class", &bytes)
        .unwrap();
    assert_eq!(references.len(), 2);
    assert!(references.iter().all(|r| r.site_suppressed));
}

#[test]
fn custom_markers_replace_the_defaults() {
    let bytes = ClassFileBuilder::new("com/example/Custom")
        .method(calls_get("custom").annotation("Lcom/example/SkipCheck;", true))
        .method(calls_get("stock").annotation(IGNORE_JRE_REQUIREMENT, false))
        .build();

    let extractor = ReferenceExtractor::with_suppression_annotations(["com.example.SkipCheck"]);
    let references = extractor.extract("Custom.class", &bytes).unwrap();
    let flags: Vec<_> = references.iter().map(|r| r.site_suppressed).collect();
    assert_eq!(flags, vec![true, false]);

    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let mut checker = CompatibilityChecker::new(&index, &ignores).with_extractor(extractor);
    assert_eq!(checker.extractor().suppression_markers(), ["Lcom/example/SkipCheck;"]);
    checker.check_class_bytes("Custom.class", &bytes).unwrap();
    assert_eq!(checker.findings().len(), 1);
}

#[test]
fn extraction_covers_calls_fields_and_type_instructions() {
    let bytes = ClassFileBuilder::new("com/example/Everything")
        .method(
            MethodBuilder::new("run", "()V")
                .new_object("java/lang/StringBuilder")
                .invoke_special("java/lang/StringBuilder", "<init>", "()V")
                .invoke_virtual("java/lang/StringBuilder", "length", "()I")
                .invoke_static("java/lang/Math", "abs", "(I)I")
                .get_field("com/example/Everything", "count", "I")
                .put_static("com/example/Everything", "LAST", "I")
                .anewarray("java/lang/String")
                .checkcast("java/lang/CharSequence")
                .instance_of("java/lang/Comparable")
                .checkcast("[Ljava/lang/String;")
                .multianewarray("[[I", 2)
                .invoke_dynamic("run", "()Ljava/lang/Runnable;")
                .ldc_int(7)
                .table_switch(0, 2)
                .lookup_switch(&[1, 10, 100]),
        )
        .build();

    let references = ReferenceExtractor::default()
        .extract("Everything.class", &bytes)
        .unwrap();
    assert_eq!(references.class_name, "com/example/Everything");

    let described: Vec<_> = references.iter().map(|r| (r.kind, r.describe())).collect();
    assert_eq!(
        described,
        vec![
            (ReferenceKind::TypeReference, "java/lang/StringBuilder".to_string()),
            (ReferenceKind::MethodCall, "java/lang/StringBuilder.<init>()V".to_string()),
            (ReferenceKind::MethodCall, "java/lang/StringBuilder.length()I".to_string()),
            (ReferenceKind::MethodCall, "java/lang/Math.abs(I)I".to_string()),
            (ReferenceKind::FieldAccess, "com/example/Everything.count#I".to_string()),
            (ReferenceKind::FieldAccess, "com/example/Everything.LAST#I".to_string()),
            (ReferenceKind::TypeReference, "java/lang/String".to_string()),
            (ReferenceKind::TypeReference, "java/lang/CharSequence".to_string()),
            (ReferenceKind::TypeReference, "java/lang/Comparable".to_string()),
        ]
    );
}

#[test]
fn abstract_methods_contribute_nothing() {
    let bytes = ClassFileBuilder::new("com/example/Shape")
        .method(MethodBuilder::abstract_method("area", "()D"))
        .build();
    let references = ReferenceExtractor::default()
        .extract("Shape.class", &bytes)
        .unwrap();
    assert!(references.is_empty());
}
