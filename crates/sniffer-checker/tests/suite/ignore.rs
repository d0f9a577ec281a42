use proptest::prelude::*;
use sniffer_checker::{CompatibilityChecker, IgnoreRuleSet, Reference, SignatureIndex};

#[test]
fn package_wildcard_matches_subpackages_only_below_the_separator() {
    let rules = IgnoreRuleSet::build(["com.foo.*"]).unwrap();
    assert!(rules.matches("com/foo/Bar"));
    assert!(rules.matches("com/foo/baz/Qux"));
    assert!(!rules.matches("com/foobar/Bar"));
}

#[test]
fn slashed_and_dotted_specs_are_equivalent() {
    let dotted = IgnoreRuleSet::build(["com.example.Generated", "org.*.asm.*"]).unwrap();
    let slashed = IgnoreRuleSet::build(["com/example/Generated", "org/*/asm/*"]).unwrap();
    for name in [
        "com/example/Generated",
        "com/example/Generated2",
        "org/objectweb/asm/Type",
        "org/asm/Type",
    ] {
        assert_eq!(dotted.matches(name), slashed.matches(name), "{name}");
    }
}

#[test]
fn ignored_owners_never_record_findings() {
    let index = SignatureIndex::default();
    let ignores = IgnoreRuleSet::build(["org.objectweb.*", "com.example.Generated"]).unwrap();
    let mut checker = CompatibilityChecker::new(&index, &ignores);

    checker.process_class(
        "App",
        [
            Reference::method("org/objectweb/asm/ClassReader", "accept", "()V"),
            Reference::type_ref("com/example/Generated"),
            Reference::field("com/example/Generated", "INSTANCE", "Lcom/example/Generated;"),
        ],
    );

    assert!(!checker.is_signature_broken());
    assert!(checker.findings().is_empty());
}

proptest! {
    #[test]
    fn trailing_star_is_a_prefix_match(
        package in "[a-z]{1,5}(\\.[a-z]{1,5}){0,2}",
        rest in "[A-Za-z0-9/$]{0,12}",
    ) {
        let rules = IgnoreRuleSet::build([format!("{package}.*")]).unwrap();
        let prefix = package.replace('.', "/");
        let inside = format!("{}/{}", prefix, rest);
        let sibling = format!("{}x/{}", prefix, rest);
        prop_assert!(rules.matches(&inside));
        prop_assert!(!rules.matches(&sibling));
    }

    #[test]
    fn cached_and_uncached_matching_agree(
        names in prop::collection::vec("[a-c]{1,2}/[a-c]{1,3}", 1..20),
    ) {
        let rules = IgnoreRuleSet::build(["a.*", "b.?c", "c.a"]).unwrap();
        let mut cache = sniffer_checker::IgnoreCache::default();
        for name in &names {
            prop_assert_eq!(rules.matches(name), rules.matches_cached(name, &mut cache));
        }
    }
}
