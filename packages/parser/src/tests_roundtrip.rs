//! Round-trip law: parse(generate(config)) is structurally equal to config,
//! key order aside.

use proptest::prelude::*;

use crate::ast::{ConfigValue, Scalar};
use crate::generate::{generate_canonical, generate_patch};
use crate::parser::{parse_document, parse_literal};
use crate::theme::Theme;

fn scalar_strategy() -> impl Strategy<Value = ConfigValue> {
    prop_oneof![
        Just(ConfigValue::Scalar(Scalar::Null)),
        any::<bool>().prop_map(ConfigValue::from),
        (-1.0e9..1.0e9f64).prop_map(ConfigValue::from),
        "[a-zA-Z0-9 _#.-]{0,12}".prop_map(ConfigValue::from),
    ]
}

fn value_strategy() -> impl Strategy<Value = ConfigValue> {
    scalar_strategy().prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(ConfigValue::Sequence),
            prop::collection::btree_map("[a-z][a-z0-9]{0,6}", inner, 0..4)
                .prop_map(|m| ConfigValue::Mapping(m.into_iter().collect())),
        ]
    })
}

fn config_strategy() -> impl Strategy<Value = ConfigValue> {
    prop::collection::btree_map("[a-z][a-z0-9]{0,6}", value_strategy(), 0..5)
        .prop_map(|m| ConfigValue::Mapping(m.into_iter().collect()))
}

proptest! {
    #[test]
    fn canonical_mode_round_trips(config in config_strategy()) {
        let html = generate_canonical(&config, &Theme::default());
        let parsed = parse_document(&html).expect("canonical output must re-parse");
        prop_assert_eq!(parsed.config, config);
    }

    #[test]
    fn patch_mode_round_trips(config in config_strategy()) {
        let source = "<script>const option = { };</script>";
        let parsed = parse_document(source).unwrap();
        let patched = generate_patch(source, &parsed, &config);
        let reparsed = parse_document(&patched).expect("patched output must re-parse");
        prop_assert_eq!(reparsed.config, config);
    }
}

#[test]
fn unknown_keys_survive_the_round_trip() {
    let config = parse_literal(
        r#"{
            series: [{ type: 'line', data: [1, 2], futureKnob: { nested: [true] } }],
            experimental: 'keep-me'
        }"#,
    )
    .unwrap();

    let html = generate_canonical(&config, &Theme::default());
    let reparsed = parse_document(&html).unwrap().config;
    assert_eq!(reparsed, config);
    assert_eq!(
        reparsed
            .get("experimental")
            .and_then(ConfigValue::as_str),
        Some("keep-me")
    );
}
