use crate::cli::Command;
use crate::config::{resolve_install_root, AppPaths, Settings};
use crate::error::Result;
use std::path::PathBuf;

pub mod bundles;
pub mod install;
pub mod list;
pub mod remove;

pub async fn dispatch(cli: crate::cli::Cli) -> std::result::Result<(), String> {
    match cli.command {
        Command::Install(args) => install::run(args).await,
        Command::Remove(args) => remove::run(args).await,
        Command::List(args) => list::run(args).await,
        Command::Bundles(args) => bundles::run(args).await,
    }
}

/// コマンド共通の設定とパス
pub(crate) struct Workspace {
    pub paths: AppPaths,
    pub settings: Settings,
    pub install_root: PathBuf,
}

impl Workspace {
    pub fn load() -> Result<Self> {
        let paths = AppPaths::from_env()?;
        let settings = Settings::load(&paths.config_file())?;
        let install_root = resolve_install_root(&settings)?;
        tracing::debug!(
            data_dir = %paths.data_dir().display(),
            install_root = %install_root.display(),
            "loaded workspace"
        );
        Ok(Self {
            paths,
            settings,
            install_root,
        })
    }
}
