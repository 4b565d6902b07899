//! srcpm install コマンド
//!
//! インポートパス・バンドルを依存ごと取得し、レジストリに記録する。

use crate::archive::{DocFilter, ExtractOptions};
use crate::bundle::BundleStore;
use crate::commands::Workspace;
use crate::fetch::FetchContext;
use crate::host::HostRegistry;
use crate::output::{CommandSummary, ConsoleReporter};
use crate::prompt::{AutoConfirm, Confirm, StdinConfirm};
use crate::registry::RegistryStore;
use crate::scanner::GoImportScanner;
use crate::vcs::{GoGetDelegate, GoGetFlags};
use crate::walker::{Flow, Session};
use clap::Parser;
use owo_colors::OwoColorize;

#[derive(Debug, Parser)]
pub struct Args {
    /// Import paths, `<name>.b` for a local bundle or `<name>.s` for a snapshot
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Extract documentation files only
    #[arg(long)]
    pub docs_only: bool,

    /// Also extract `example` directories
    #[arg(long)]
    pub examples: bool,

    /// Delegate to `go get` when a version control tool is installed
    #[arg(long)]
    pub vcs: bool,

    /// Pass `-u` to `go get`
    #[arg(long, requires = "vcs")]
    pub update: bool,

    /// Pass `-d` to `go get`
    #[arg(long, requires = "vcs")]
    pub download_only: bool,

    /// Skip bundle confirmation
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn run(args: Args) -> Result<(), String> {
    // 1. 設定とローカルデータを読み込み
    let workspace = Workspace::load().map_err(|e| e.to_string())?;
    let settings = &workspace.settings;

    let hosts = HostRegistry::with_defaults(&settings.http_config(), &settings.auth_provider())
        .map_err(|e| e.to_string())?;
    let docs = DocFilter::new(&settings.doc_patterns).map_err(|e| e.to_string())?;
    let scanner = GoImportScanner::new().map_err(|e| e.to_string())?;
    let bundles = BundleStore::load(&workspace.paths.bundles_file()).map_err(|e| e.to_string())?;
    let store = RegistryStore::with_path(workspace.paths.nodes_file());
    let mut registry = store.load().map_err(|e| e.to_string())?;

    let mut reporter = ConsoleReporter::new();
    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirm)
    };
    let mut delegate = GoGetDelegate::new(GoGetFlags {
        download_only: args.download_only,
        update: args.update,
    });

    println!(
        "{} Installing into {}",
        "i".cyan(),
        workspace.install_root.display()
    );

    // 2. 依存を辿って取得
    let fetch = FetchContext {
        install_root: &workspace.install_root,
        extract: ExtractOptions {
            docs_only: args.docs_only,
            include_examples: args.examples,
        },
        docs: &docs,
        default_branches: &settings.default_branches,
        scanner: &scanner,
    };
    let flow = {
        let mut session = Session::new(
            &hosts,
            fetch,
            &bundles,
            &mut registry,
            &mut reporter,
            confirm.as_mut(),
        );
        if args.vcs {
            session = session.with_delegate(&mut delegate);
        }
        session.install(&args.packages).await
    };

    if flow == Flow::Cancelled {
        println!("Install cancelled.");
        return Ok(());
    }

    // 3. レジストリを保存
    if registry.is_modified() {
        store.save(&registry).map_err(|e| e.to_string())?;
    }

    println!("{}", CommandSummary::format(reporter.tally(), "installed"));
    Ok(())
}
