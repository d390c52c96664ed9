//! CLI display utilities for `--list`

use crate::classify::Classifier;
use crate::core::styles::StyleRole;
use crate::plugin::api::{describe_failures, PluginRegistry};
use prettytable::{format, Cell, Row, Table};

fn header(names: &[&str], use_color: bool) -> Row {
    Row::new(
        names
            .iter()
            .map(|name| {
                let cell = Cell::new(name);
                match StyleRole::Header.to_prettytable_spec() {
                    Some(spec) if use_color => cell.style_spec(&spec),
                    _ => cell,
                }
            })
            .collect(),
    )
}

fn new_table(names: &[&str], use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(header(names, use_color));
    table
}

/// Discovered plugins grouped by category, then any that failed to load
pub fn plugin_table(registry: &PluginRegistry, use_color: bool) -> String {
    if registry.plugin_count() == 0 && registry.failures().is_empty() {
        return "No plugins discovered.\n".to_string();
    }

    let mut plugins: Vec<_> = registry.all_plugins().iter().collect();
    plugins.sort_by(|a, b| a.category.cmp(&b.category).then(a.name.cmp(&b.name)));

    let mut table = new_table(
        &["Category", "Plugin", "Prerequisite", "Source", "Description"],
        use_color,
    );
    for plugin in plugins {
        table.add_row(Row::new(vec![
            Cell::new(&plugin.category),
            Cell::new(&plugin.name),
            Cell::new(plugin.prerequisite.as_deref().unwrap_or("")),
            Cell::new(&plugin.origin()),
            Cell::new(&plugin.description),
        ]));
    }
    let mut out = table.to_string();

    let failures = describe_failures(registry);
    if !failures.is_empty() {
        let mut failed = new_table(&["Not loaded", "Reason"], use_color);
        for (source, reason) in failures {
            failed.add_row(Row::new(vec![Cell::new(&source), Cell::new(&reason)]));
        }
        out.push('\n');
        out.push_str(&failed.to_string());
    }
    out
}

/// Registered categories in matching order
pub fn category_table(classifier: &Classifier, use_color: bool) -> String {
    let mut table = new_table(&["Category", "Description"], use_color);
    for category in classifier.categories() {
        table.add_row(Row::new(vec![
            Cell::new(&category.name),
            Cell::new(&category.description),
        ]));
    }
    table.to_string()
}
