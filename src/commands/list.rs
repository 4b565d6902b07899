//! srcpm list コマンド
//!
//! レジストリに記録されたパッケージの一覧を表示する。

use crate::commands::Workspace;
use crate::node::Node;
use crate::registry::RegistryStore;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Table};

#[derive(Debug, Parser)]
pub struct Args {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: Args) -> Result<(), String> {
    let workspace = Workspace::load().map_err(|e| e.to_string())?;
    let store = RegistryStore::with_path(workspace.paths.nodes_file());
    let registry = store.load().map_err(|e| e.to_string())?;
    tracing::debug!(path = %store.path().display(), "loaded registry");

    if args.json {
        println!("{}", render_json(registry.nodes())?);
    } else if registry.is_empty() {
        println!("No packages installed");
    } else {
        println!("{}", build_table(registry.nodes()));
        println!("Total: {} package(s)", registry.len());
    }
    Ok(())
}

fn render_json(nodes: &[Node]) -> Result<String, String> {
    serde_json::to_string_pretty(nodes).map_err(|e| format!("Failed to serialize packages: {}", e))
}

fn build_table(nodes: &[Node]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Import Path", "Type", "Value"]);
    for node in nodes {
        table.add_row(vec![
            node.import_path.clone(),
            node.node_type.to_string(),
            node.value.clone(),
        ]);
    }
    table
}

#[cfg(test)]
#[path = "list_test.rs"]
mod tests;
