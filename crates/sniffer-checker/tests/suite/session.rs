use std::fs::File;

use sniffer_checker::{CheckError, CheckSession, ClassSignature, MalformedClassPolicy};
use sniffer_config::SnifferConfig;
use sniffer_signatures::SignatureWriter;
use sniffer_test_utils::{ClassDirFixture, ClassFileBuilder, MethodBuilder, IGNORE_JRE_REQUIREMENT};

fn write_baseline(path: &std::path::Path) {
    let mut writer = SignatureWriter::new(File::create(path).unwrap()).unwrap();
    writer.write(&ClassSignature::new("java/lang/Object")).unwrap();
    writer
        .write(
            &ClassSignature::new("java/util/List")
                .with_interfaces(["java/lang/Iterable"])
                .with_members(["size()I"]),
        )
        .unwrap();
    writer.finish().unwrap();
}

fn app_classes(fixture: &ClassDirFixture) {
    fixture.add_class(
        "com/example/Uses",
        &ClassFileBuilder::new("com/example/Uses")
            .method(
                MethodBuilder::new("first", "(Ljava/util/List;)Ljava/lang/Object;")
                    .invoke_interface("java/util/List", "get", "(I)Ljava/lang/Object;"),
            )
            .method(
                MethodBuilder::new("asm", "()V").new_object("org/objectweb/asm/ClassReader"),
            )
            .method(
                MethodBuilder::new("guarded", "()V")
                    .annotation(IGNORE_JRE_REQUIREMENT, false)
                    .new_object("java/util/stream/Stream"),
            )
            .build(),
    );
}

#[test]
fn session_from_config_checks_a_class_directory() {
    let workspace = ClassDirFixture::new();
    write_baseline(&workspace.root().join("java18.sig"));
    let config_path = workspace.add_file(
        "sniffer.toml",
        br#"
baseline = "java18.sig"
ignores = ["org.objectweb.*"]
"#,
    );

    let classes = ClassDirFixture::new();
    app_classes(&classes);

    let config = SnifferConfig::load_from_path(&config_path).unwrap();
    let session = CheckSession::from_config(&config).unwrap();
    assert_eq!(session.index().len(), 2);

    let outcome = session.check_paths([classes.root()]).unwrap();
    assert!(outcome.is_signature_broken());
    let messages: Vec<_> = outcome.findings.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Undefined reference: java/util/List.get(I)Ljava/lang/Object;"]
    );
}

#[test]
fn parallel_session_agrees_with_sequential_session() {
    let workspace = ClassDirFixture::new();
    let baseline = workspace.root().join("java18.sig");
    write_baseline(&baseline);

    let classes = ClassDirFixture::new();
    app_classes(&classes);

    let config = SnifferConfig {
        baseline: Some(baseline),
        ignores: vec!["org.objectweb.*".to_string()],
        ..SnifferConfig::default()
    };
    let sequential = CheckSession::from_config(&config)
        .unwrap()
        .check_paths([classes.root()])
        .unwrap();
    let parallel = CheckSession::from_config(&config)
        .unwrap()
        .with_parallel(true)
        .check_paths([classes.root()])
        .unwrap();

    assert_eq!(parallel, sequential);
}

#[test]
fn missing_baseline_is_a_configuration_error() {
    let err = CheckSession::from_config(&SnifferConfig::default()).unwrap_err();
    assert!(matches!(err, CheckError::MissingBaseline));
}

#[test]
fn bad_ignore_pattern_fails_before_any_class_is_read() {
    let workspace = ClassDirFixture::new();
    let baseline = workspace.root().join("java18.sig");
    write_baseline(&baseline);

    let config = SnifferConfig {
        baseline: Some(baseline),
        ignores: vec!["com..example".to_string()],
        ..SnifferConfig::default()
    };
    let err = CheckSession::from_config(&config).unwrap_err();
    assert!(matches!(err, CheckError::IgnorePattern(_)), "{err:?}");
}

#[test]
fn corrupt_baseline_surfaces_as_baseline_error() {
    let workspace = ClassDirFixture::new();
    let baseline = workspace.add_file("java18.sig", b"not gzip at all");

    let config = SnifferConfig {
        baseline: Some(baseline),
        malformed_classes: MalformedClassPolicy::Continue,
        ..SnifferConfig::default()
    };
    let err = CheckSession::from_config(&config).unwrap_err();
    assert!(matches!(err, CheckError::Baseline(_)), "{err:?}");
}
