//! Model catalog command for MCP Bot
//!
//! Lists the models each provider offers, marking the default and the
//! currently selected model.

use crate::providers::ProviderKind;
use colored::Colorize;
use prettytable::{format, row, Table};

/// Build the catalog table for the given providers
///
/// `selected` is the provider and model currently in use, if any; that row
/// is marked in the "Active" column.
pub fn models_table(providers: &[ProviderKind], selected: Option<(ProviderKind, &str)>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(row!["Provider", "Model", "Label", "Default", "Active"]);

    for &kind in providers {
        for model in kind.models() {
            let default_mark = if model.id == kind.default_model() {
                "yes"
            } else {
                ""
            };
            let active_mark = if selected == Some((kind, model.id)) {
                "*"
            } else {
                ""
            };
            table.add_row(row![
                kind.display_name(),
                model.id,
                model.label,
                default_mark,
                active_mark
            ]);
        }
    }

    table
}

/// Print the catalog of one provider, or of all providers when `provider` is None
pub fn list_models(provider: Option<ProviderKind>, selected: Option<(ProviderKind, &str)>) {
    let providers: Vec<ProviderKind> = match provider {
        Some(kind) => vec![kind],
        None => ProviderKind::ALL.to_vec(),
    };
    tracing::debug!("Listing models for {} providers", providers.len());

    println!("\n{}", "Available Models:".bold());
    models_table(&providers, selected).printstd();
    println!();
    println!(
        "Use {} to switch models in chat, or {} when setting a key.",
        "/model <name>".cyan(),
        "mcpbot configure --model <name>".cyan()
    );
    println!();
}
