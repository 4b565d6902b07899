use clap::{Parser, Subcommand};

use crate::commands::{bundles, install, list, remove};

#[derive(Debug, Parser)]
#[command(name = "srcpm")]
#[command(about = "Source package manager for Go import paths", long_about = None)]
pub struct Cli {
    /// デバッグログを有効化
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// パッケージを依存ごと取得
    #[command(about = "Download packages and their dependencies")]
    Install(install::Args),

    /// パッケージを削除
    #[command(about = "Remove installed packages")]
    Remove(remove::Args),

    /// インストール済みパッケージ一覧
    #[command(about = "List installed packages")]
    List(list::Args),

    /// ローカルバンドル一覧
    #[command(about = "List local bundles")]
    Bundles(bundles::Args),
}
