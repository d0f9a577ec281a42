use sniffer_checker::{CompatibilityChecker, IgnoreRuleSet, Severity};
use sniffer_test_utils::{ClassFileBuilder, MethodBuilder};

use super::list_baseline;

#[test]
fn declared_method_resolves_cleanly() {
    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let mut checker = CompatibilityChecker::new(&index, &ignores);

    let bytes = ClassFileBuilder::new("com/example/Sizes")
        .method(MethodBuilder::new("count", "(Ljava/util/List;)I").invoke_interface(
            "java/util/List",
            "size",
            "()I",
        ))
        .build();
    checker.check_class_bytes("com/example/Sizes.class", &bytes).unwrap();

    assert!(!checker.is_signature_broken());
    assert!(checker.findings().is_empty());
}

#[test]
fn undeclared_method_is_reported_once_with_class_name() {
    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let mut checker = CompatibilityChecker::new(&index, &ignores);

    let bytes = ClassFileBuilder::new("com/example/First")
        .method(
            MethodBuilder::new("first", "(Ljava/util/List;)Ljava/lang/Object;").invoke_interface(
                "java/util/List",
                "get",
                "(I)Ljava/lang/Object;",
            ),
        )
        .build();
    checker.check_class_bytes("com/example/First.class", &bytes).unwrap();

    assert!(checker.is_signature_broken());
    let findings = checker.findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Error);
    assert_eq!(
        findings[0].to_string(),
        "Undefined reference: java/util/List.get(I)Ljava/lang/Object; in com/example/First.class"
    );
}

#[test]
fn verdict_stays_broken_after_clean_classes() {
    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let mut checker = CompatibilityChecker::new(&index, &ignores);

    let broken = ClassFileBuilder::new("com/example/Broken")
        .method(MethodBuilder::new("run", "()V").new_object("java/util/ArrayList"))
        .build();
    let clean = ClassFileBuilder::new("com/example/Clean")
        .method(MethodBuilder::new("run", "()V").invoke_special(
            "java/lang/Object",
            "<init>",
            "()V",
        ))
        .build();

    checker.check_class_bytes("Broken.class", &broken).unwrap();
    assert!(checker.is_signature_broken());
    checker.check_class_bytes("Clean.class", &clean).unwrap();
    checker.check_class_bytes("Clean.class", &clean).unwrap();
    assert!(checker.is_signature_broken());

    let outcome = checker.into_outcome();
    assert!(outcome.is_signature_broken());
    assert_eq!(
        outcome.findings.iter().map(|f| f.message.as_str()).collect::<Vec<_>>(),
        vec!["Undefined reference: java/util/ArrayList"]
    );
}

#[test]
fn field_references_use_the_hash_form() {
    let index: sniffer_checker::SignatureIndex = [sniffer_checker::ClassSignature::new(
        "java/lang/System",
    )
    .with_members(["out#Ljava/io/PrintStream;"])]
    .into_iter()
    .collect();
    let ignores = IgnoreRuleSet::default();
    let mut checker = CompatibilityChecker::new(&index, &ignores);

    let bytes = ClassFileBuilder::new("com/example/Printer")
        .method(
            MethodBuilder::new("print", "()V")
                .get_static("java/lang/System", "out", "Ljava/io/PrintStream;")
                .get_static("java/lang/System", "err", "Ljava/io/PrintStream;"),
        )
        .build();
    checker.check_class_bytes("Printer.class", &bytes).unwrap();

    let messages: Vec<_> = checker.findings().iter().map(|f| f.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Undefined reference: java/lang/System.err#Ljava/io/PrintStream;"]
    );
}

#[test]
fn malformed_class_does_not_touch_the_verdict() {
    let index = list_baseline();
    let ignores = IgnoreRuleSet::default();
    let mut checker = CompatibilityChecker::new(&index, &ignores);

    let mut bytes = ClassFileBuilder::new("com/example/Truncated")
        .method(MethodBuilder::new("run", "()V").new_object("java/util/ArrayList"))
        .build();
    bytes.truncate(bytes.len() / 2);

    let err = checker.check_class_bytes("Truncated.class", &bytes).unwrap_err();
    assert_eq!(err.class, "Truncated.class");
    assert!(err.to_string().starts_with("bad class file Truncated.class"));
    assert!(!checker.is_signature_broken());
    assert!(checker.findings().is_empty());
}
