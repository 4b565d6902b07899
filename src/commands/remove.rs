//! srcpm remove コマンド

use crate::bundle::BundleStore;
use crate::commands::Workspace;
use crate::host::HostRegistry;
use crate::output::{CommandSummary, ConsoleReporter};
use crate::prompt::{AutoConfirm, Confirm, StdinConfirm};
use crate::registry::RegistryStore;
use crate::remove::RemoveSession;
use crate::walker::Flow;
use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    /// Import paths, `<name>.b` for a local bundle or `<name>.s` for a snapshot
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Skip bundle confirmation
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn run(args: Args) -> Result<(), String> {
    let workspace = Workspace::load().map_err(|e| e.to_string())?;
    let settings = &workspace.settings;

    let hosts = HostRegistry::with_defaults(&settings.http_config(), &settings.auth_provider())
        .map_err(|e| e.to_string())?;
    let bundles = BundleStore::load(&workspace.paths.bundles_file()).map_err(|e| e.to_string())?;
    let store = RegistryStore::with_path(workspace.paths.nodes_file());
    let mut registry = store.load().map_err(|e| e.to_string())?;

    let mut reporter = ConsoleReporter::new();
    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirm)
    };

    let flow = RemoveSession::new(
        &hosts,
        &workspace.install_root,
        &bundles,
        &mut registry,
        &mut reporter,
        confirm.as_mut(),
    )
    .remove(&args.packages);

    if flow == Flow::Cancelled {
        println!("Remove cancelled.");
        return Ok(());
    }

    if registry.is_modified() {
        store.save(&registry).map_err(|e| e.to_string())?;
    }

    println!("{}", CommandSummary::format(reporter.tally(), "removed"));
    Ok(())
}
