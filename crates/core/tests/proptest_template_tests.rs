//! Property-based tests for template rendering.
//!
//! These tests verify the behavioral contracts of templates:
//! - Literal text renders unchanged regardless of bound parameters
//! - Rendering is deterministic for fixed inputs
//! - Binding a parameter never changes the template it was derived from

use binvendor_core::template::{Parameters, Template, Value, render};
use proptest::prelude::*;

/// Text that contains no template tags
fn literal_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ./:_-]{0,40}".prop_map(String::from)
}

fn parameter_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}".prop_map(String::from)
}

fn parameters_strategy() -> impl Strategy<Value = Parameters> {
    prop::collection::btree_map(
        parameter_name_strategy(),
        prop_oneof![
            Just(Value::Nil),
            "[a-z0-9.]{0,10}".prop_map(Value::Text),
        ],
        0..6,
    )
}

proptest! {
    #[test]
    fn literal_templates_render_unchanged(literal in literal_strategy(), parameters in parameters_strategy()) {
        prop_assert_eq!(render(&literal, &parameters).unwrap(), literal);
    }

    #[test]
    fn rendering_is_deterministic(
        prefix in literal_strategy(),
        name in parameter_name_strategy(),
        value in "[a-z0-9.]{0,10}",
    ) {
        let source = format!("{prefix}<%= {name} %>");
        let template = Template::new(source).with_parameter(name, value.clone());
        let first = template.render().unwrap();
        let second = template.render().unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, format!("{prefix}{value}"));
    }

    #[test]
    fn binding_does_not_affect_the_base(
        name in parameter_name_strategy(),
        a in "[a-z]{1,5}",
        b in "[a-z]{1,5}",
    ) {
        let base = Template::new(format!("<%= {name} %>"));
        let first = base.with_parameter(name.clone(), a.clone());
        let second = base.with_parameter(name, b.clone());
        prop_assert!(base.parameters().is_empty());
        prop_assert_eq!(first.render().unwrap(), a);
        prop_assert_eq!(second.render().unwrap(), b);
    }
}
