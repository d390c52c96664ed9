//! Tests for the `--list` tables

use crate::app::cli::display::{category_table, plugin_table};
use crate::classify::Classifier;
use crate::plugin::api::{discover_with, PluginError, PluginRegistry};
use crate::plugin::tests::utils::{descriptor, MockBehaviour};

#[test]
fn test_plugin_table_lists_plugins_and_failures() {
    let mut registry = discover_with(
        vec![
            descriptor("Strings", "Generic", MockBehaviour::OneRow),
            descriptor("PE Info", "EXE", MockBehaviour::OneRow).with_prerequisite("Strings"),
        ],
        &[],
        &[],
    );
    registry.record_failure(
        "/plugins/broken.toml",
        PluginError::LoadError {
            plugin_name: "/plugins/broken.toml".to_string(),
            cause: "bad toml".to_string(),
        },
    );

    let text = plugin_table(&registry, false);
    assert!(text.contains("PE Info"));
    assert!(text.contains("Strings"));
    assert!(text.contains("builtin"));
    assert!(text.contains("/plugins/broken.toml"));
    // EXE sorts before Generic
    assert!(text.find("PE Info").unwrap() < text.find("Generic").unwrap());
}

#[test]
fn test_empty_registry() {
    assert_eq!(
        plugin_table(&PluginRegistry::new(), false),
        "No plugins discovered.\n"
    );
}

#[test]
fn test_category_table_in_matching_order() {
    let text = category_table(&Classifier::default(), false);
    let generic = text.find("Generic").unwrap();
    let zip = text.find("ZIP").unwrap();
    assert!(generic < zip);
    assert!(text.contains("PDF"));
}
