//! VCS への委譲
//!
//! `--vcs` 指定時、対応するツールが使えるパスは `go get` に丸ごと任せる。
//! 委譲先のプロトコルには関与しない。

use crate::error::{Result, SrcpmError};
use std::collections::HashMap;
use std::process::{Command, Stdio};

/// バージョン管理ツール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsTool {
    Git,
}

impl VcsTool {
    pub fn binary(&self) -> &'static str {
        match self {
            VcsTool::Git => "git",
        }
    }

    /// インポートパスのホストに対応するツール
    pub fn for_path(import_path: &str) -> Option<Self> {
        const GIT_HOSTS: [&str; 3] = ["github.com/", "gitlab.com/", "bitbucket.org/"];
        GIT_HOSTS
            .iter()
            .any(|prefix| import_path.starts_with(prefix))
            .then_some(VcsTool::Git)
    }
}

/// `go get` のフラグ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoGetFlags {
    /// `-d`（ダウンロードのみ。`-u` も付く）
    pub download_only: bool,
    /// `-u`
    pub update: bool,
}

impl GoGetFlags {
    pub fn args(&self, import_path: &str) -> Vec<String> {
        let mut args = vec!["get".to_string()];
        if self.download_only {
            args.push("-d".to_string());
        }
        if self.download_only || self.update {
            args.push("-u".to_string());
        }
        args.push(import_path.to_string());
        args
    }
}

/// 委譲先 trait
pub trait VcsDelegate {
    /// ツールが使えるか
    fn is_available(&mut self, tool: VcsTool) -> bool;

    /// パッケージの取得を委譲
    fn delegate(&mut self, import_path: &str) -> Result<()>;
}

/// 委譲するかを決める
///
/// `prefer_vcs` が有効で、パスのホストに対応するツールが使える場合のみ。
pub fn should_delegate<D: VcsDelegate + ?Sized>(
    prefer_vcs: bool,
    import_path: &str,
    delegate: &mut D,
) -> Option<VcsTool> {
    if !prefer_vcs {
        return None;
    }
    VcsTool::for_path(import_path).filter(|tool| delegate.is_available(*tool))
}

/// `go get` を実行する委譲先
pub struct GoGetDelegate {
    flags: GoGetFlags,
    probed: HashMap<VcsTool, bool>,
}

impl GoGetDelegate {
    pub fn new(flags: GoGetFlags) -> Self {
        Self {
            flags,
            probed: HashMap::new(),
        }
    }
}

impl VcsDelegate for GoGetDelegate {
    fn is_available(&mut self, tool: VcsTool) -> bool {
        *self.probed.entry(tool).or_insert_with(|| {
            let available = Command::new(tool.binary())
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|s| s.success())
                .unwrap_or(false);
            tracing::debug!(tool = tool.binary(), available, "probed vcs tool");
            available
        })
    }

    fn delegate(&mut self, import_path: &str) -> Result<()> {
        let args = self.flags.args(import_path);
        tracing::debug!(?args, "running go");
        let status = Command::new("go").args(&args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(SrcpmError::Vcs(format!(
                "go get {} exited with {}",
                import_path, status
            )))
        }
    }
}
