//! Instance disambiguation integration tests
//!
//! Several fieldsets of one object type are mounted from sibling scopes onto one screen and
//! then located by their render addresses.

mod common;

use common::{map, user_dependencies, user_schema};
use relbind_core::{
    binding::{ObjectDataProps, ScopeStack},
    fieldset::{FieldsetResolver, ResolveOptions},
    locate::{
        InstanceDisambiguator, OnlyKinds, RenderNode, Screen, EXTERNAL_ID_ATTRIBUTE,
        INDEX_ATTRIBUTE, OBJECT_TYPE_ATTRIBUTE,
    },
    properties::ObjectKey,
    BindingError, ErrorClass,
};
use serde_json::json;
use test_log::test;

/// Mount one user fieldset per display name, all sharing `external_id`.
fn mount_users(names: &[&str], external_id: &str) -> Vec<RenderNode> {
    let resolver = FieldsetResolver::default();
    let schema = user_schema();
    let deps = user_dependencies();
    let mut stack = ScopeStack::new();
    names
        .iter()
        .map(|name| {
            let rendered = stack
                .with_scope(
                    ObjectDataProps::new()
                        .with_data(map(json!({ "displayName": name })))
                        .with_object_id(external_id),
                    |stack| {
                        resolver.mount(
                            &schema,
                            stack.current()?,
                            &ObjectKey::main(),
                            &deps,
                            &ResolveOptions::new(),
                            Some("User"),
                        )
                    },
                )
                .unwrap();
            RenderNode::Fieldset(rendered)
        })
        .collect()
}

fn three_users() -> Screen {
    let mut screen = Screen::new();
    for node in mount_users(&["first", "second", "third"], "same") {
        screen.mount(node);
    }
    screen
}

fn display_name(fieldset: &relbind_core::locate::RenderedFieldset) -> String {
    fieldset
        .field("displayName")
        .and_then(|f| f.value.clone())
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[test]
fn test_ambiguous_without_index() {
    let screen = three_users();
    let err = InstanceDisambiguator::default()
        .locate(&screen, "User", Some("same"), None)
        .unwrap_err();
    assert_eq!(
        err,
        BindingError::Ambiguous {
            count: 3,
            address: "object type 'User' with external id 'same'".to_string()
        }
    );
    assert_eq!(err.class(), ErrorClass::Ambiguity);
    let msg = err.to_string();
    assert!(msg.contains('3'), "{msg}");
    assert!(msg.contains("0..3"), "{msg}");
}

#[test]
fn test_index_picks_in_render_order() {
    let screen = three_users();
    let disambiguator = InstanceDisambiguator::default();
    for (index, expected) in ["first", "second", "third"].iter().enumerate() {
        let found = disambiguator
            .locate(&screen, "User", Some("same"), Some(index))
            .unwrap();
        assert_eq!(display_name(found), *expected);
    }
    // Deterministic across calls
    let again = disambiguator
        .locate(&screen, "User", Some("same"), Some(1))
        .unwrap();
    assert_eq!(display_name(again), "second");
}

#[test]
fn test_index_out_of_bounds() {
    let screen = three_users();
    let err = InstanceDisambiguator::default()
        .locate(&screen, "User", Some("same"), Some(3))
        .unwrap_err();
    assert!(matches!(
        err,
        BindingError::IndexOutOfBounds {
            count: 3,
            index: 3,
            ..
        }
    ));
    assert!(err.to_string().contains("Index 3"));
}

#[test]
fn test_no_match() {
    let screen = three_users();
    let disambiguator = InstanceDisambiguator::default();
    assert!(matches!(
        disambiguator.locate(&screen, "User", Some("other"), None),
        Err(BindingError::NotFound(_))
    ));
    assert!(matches!(
        disambiguator.locate(&screen, "Team", None, Some(0)),
        Err(BindingError::NotFound(_))
    ));
    assert!(matches!(
        disambiguator.locate(&Screen::new(), "User", None, None),
        Err(BindingError::NotFound(_))
    ));
}

#[test]
fn test_container_unwrap_is_injectable() {
    let mut screen = Screen::new();
    screen.mount(RenderNode::container("card", mount_users(&["carded"], "u1")));
    screen.mount(RenderNode::container(
        "panel",
        vec![RenderNode::container("card", mount_users(&["paneled"], "u1"))],
    ));

    let cards_only = InstanceDisambiguator::new(OnlyKinds(vec!["card".to_string()]));
    let found = cards_only.locate(&screen, "User", Some("u1"), None).unwrap();
    assert_eq!(display_name(found), "carded");

    let everything = InstanceDisambiguator::default();
    assert!(matches!(
        everything.locate(&screen, "User", Some("u1"), None),
        Err(BindingError::Ambiguous { count: 2, .. })
    ));
    let found = everything
        .locate(&screen, "User", Some("u1"), Some(1))
        .unwrap();
    assert_eq!(display_name(found), "paneled");
}

#[test]
fn test_addresses_expose_stable_coordinates() {
    let screen = three_users();
    let addresses = InstanceDisambiguator::default().addresses(&screen);
    assert_eq!(addresses.len(), 3);
    for (index, attributes) in addresses.iter().enumerate() {
        assert_eq!(attributes[OBJECT_TYPE_ATTRIBUTE], "User");
        assert_eq!(attributes[EXTERNAL_ID_ATTRIBUTE], "same");
        assert_eq!(attributes[INDEX_ATTRIBUTE], index.to_string());
    }
}
