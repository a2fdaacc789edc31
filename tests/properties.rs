use std::collections::BTreeMap;

use envdoc::{marshal, parse_str_with_env};
use proptest::prelude::*;

fn no_env() -> BTreeMap<String, String> {
    BTreeMap::new()
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,12}"
}

// `$` is left out: marshaled values are double-quoted, which expands placeholders.
fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,6}",
        "[^$]{0,24}",
        "[ a-z#'\"\\\\\t\r\n=:]{0,16}",
    ]
}

fn vars_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..12)
}

proptest! {
    #[test]
    fn marshal_then_parse_round_trips(vars in vars_strategy()) {
        let text = marshal(&vars);
        let parsed = parse_str_with_env(&text, &no_env()).expect("marshaled text should parse");
        prop_assert_eq!(parsed.to_map(), vars);
    }

    #[test]
    fn marshal_output_is_a_fixed_point(vars in vars_strategy()) {
        let first = marshal(&vars);
        let parsed = parse_str_with_env(&first, &no_env()).expect("marshaled text should parse");
        let second = marshal(&parsed);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn single_quoted_values_are_verbatim(value in "[^'\r\n]{0,24}") {
        let text = format!("KEY='{value}'\n");
        let parsed = parse_str_with_env(&text, &no_env()).expect("single-quoted value should parse");
        prop_assert_eq!(parsed.get("KEY"), Some(value.as_str()));
    }
}

#[test]
fn marshal_sorts_and_quotes() {
    let mut vars = BTreeMap::new();
    vars.insert("PORT", "3000");
    vars.insert("HOST", "localhost");

    assert_eq!(marshal(vars), "HOST=\"localhost\"\nPORT=3000\n");
}
