//! srcpm bundles コマンド

use crate::bundle::{Bundle, BundleStore};
use crate::commands::Workspace;
use clap::Parser;
use owo_colors::OwoColorize;

#[derive(Debug, Parser)]
pub struct Args {}

pub async fn run(_args: Args) -> Result<(), String> {
    let workspace = Workspace::load().map_err(|e| e.to_string())?;
    let path = workspace.paths.bundles_file();
    let store = BundleStore::load(&path).map_err(|e| e.to_string())?;

    if store.bundles().is_empty() {
        println!("No bundles defined in {}", path.display());
        return Ok(());
    }

    for bundle in store.bundles() {
        println!("{}", describe(bundle).join("\n"));
    }
    Ok(())
}

/// バンドル名と展開後のメンバー
fn describe(bundle: &Bundle) -> Vec<String> {
    let members = bundle.expand();
    let mut lines = vec![format!(
        "{} ({} packages)",
        bundle.name.bold(),
        members.len()
    )];
    lines.extend(
        crate::walker::member_labels(&members)
            .into_iter()
            .map(|label| format!("  {}", label)),
    );
    lines
}
