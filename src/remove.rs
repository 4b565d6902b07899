//! パッケージ削除
//!
//! インストール先のソース、ビルド済みパッケージ、実行ファイルを削除し、
//! レジストリからも取り除く。依存パッケージの削除は行わない。

use crate::bundle::{self, BundleStore, Request};
use crate::error::{Result, SrcpmError};
use crate::host::HostRegistry;
use crate::node::Node;
use crate::output::{PackageEvent, PackageStatus, Reporter};
use crate::prompt::Confirm;
use crate::registry::Registry;
use crate::walker::{member_labels, Flow};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Go のプラットフォーム名（`<os>_<arch>`）
pub fn go_platform() -> String {
    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        other => other,
    };
    format!("{}_{}", std::env::consts::OS, arch)
}

/// インポートパスのプロジェクトパス
///
/// 登録ホストに一致すればホストの規則で、それ以外はリモートパスの先頭3要素を使う。
pub fn project_path(hosts: &HostRegistry, import_path: &str) -> Option<String> {
    if let Ok((host, groups)) = hosts.classify(import_path) {
        return Some(host.project_path(&groups));
    }

    let segments: Vec<&str> = import_path.split('/').collect();
    let remote = segments.first().is_some_and(|s| s.contains('.'));
    if remote && segments.len() >= 3 && segments[..3].iter().all(|s| !s.is_empty()) {
        Some(segments[..3].join("/"))
    } else {
        None
    }
}

fn remove_if_exists(path: &Path, dir: bool) -> Result<()> {
    let result = if dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SrcpmError::fs(path)(e)),
    }
}

/// 削除のセッション
pub struct RemoveSession<'a> {
    hosts: &'a HostRegistry,
    install_root: &'a Path,
    bundles: &'a BundleStore,
    registry: &'a mut Registry,
    reporter: &'a mut dyn Reporter,
    confirm: &'a mut dyn Confirm,
    remove_cache: HashSet<String>,
}

impl<'a> RemoveSession<'a> {
    pub fn new(
        hosts: &'a HostRegistry,
        install_root: &'a Path,
        bundles: &'a BundleStore,
        registry: &'a mut Registry,
        reporter: &'a mut dyn Reporter,
        confirm: &'a mut dyn Confirm,
    ) -> Self {
        Self {
            hosts,
            install_root,
            bundles,
            registry,
            reporter,
            confirm,
            remove_cache: HashSet::new(),
        }
    }

    /// コマンドライン引数を処理する
    pub fn remove(&mut self, requests: &[String]) -> Flow {
        let nodes = requests.iter().map(Node::new).collect();
        self.walk(nodes)
    }

    fn walk(&mut self, nodes: Vec<Node>) -> Flow {
        for node in nodes {
            let flow = match Request::parse(&node.import_path) {
                Request::Bundle(name) => self.walk_bundle(name),
                Request::Snapshot(name) => {
                    self.report(
                        &format!("{}{}", name, bundle::SNAPSHOT_SUFFIX),
                        PackageStatus::SnapshotUnsupported,
                    );
                    Flow::Continue
                }
                Request::Path(path) => {
                    self.remove_path(path);
                    Flow::Continue
                }
            };
            if flow == Flow::Cancelled {
                return Flow::Cancelled;
            }
        }
        Flow::Continue
    }

    fn walk_bundle(&mut self, name: &str) -> Flow {
        let label = format!("{}{}", name, bundle::BUNDLE_SUFFIX);
        let members = match self.bundles.expand(name) {
            Ok(members) => members,
            Err(_) => {
                self.report(&label, PackageStatus::BundleNotFound);
                return Flow::Continue;
            }
        };

        self.report(&label, PackageStatus::BundleExpanded(member_labels(&members)));
        let message = format!("Continue removing bundle '{}'?", name);
        if !self.confirm.confirm(&message) {
            return Flow::Cancelled;
        }

        self.walk(members)
    }

    fn remove_path(&mut self, import_path: &str) {
        if !self.remove_cache.insert(import_path.to_string()) {
            self.report(import_path, PackageStatus::SkippedDuplicate);
            return;
        }

        let Some(project) = project_path(self.hosts, import_path) else {
            self.report(import_path, PackageStatus::SkippedInvalid);
            return;
        };

        let src_dir = self.install_root.join("src").join(&project);
        if !src_dir.exists() {
            self.report(import_path, PackageStatus::NotInstalled);
            return;
        }

        if let Err(e) = remove_if_exists(&src_dir, true) {
            tracing::warn!(import_path, error = %e, "remove failed");
            self.report(import_path, PackageStatus::Failed(e.to_string()));
            return;
        }

        // ソースが消えた時点でレジストリから外す
        self.registry.remove(&project);
        if project != import_path {
            self.registry.remove(import_path);
        }

        if let Err(e) = self.remove_artifacts(import_path) {
            tracing::warn!(import_path, error = %e, "failed to remove build artifacts");
        }
        tracing::debug!(src = %src_dir.display(), "removed package files");
        self.report(import_path, PackageStatus::Removed);
    }

    /// `bin/` と `pkg/<os>_<arch>/` のビルド成果物を削除
    fn remove_artifacts(&self, import_path: &str) -> Result<()> {
        if let Some(exe) = import_path.rsplit('/').next().filter(|s| !s.is_empty()) {
            remove_if_exists(&self.install_root.join("bin").join(exe), false)?;
        }

        let pkg_dir: PathBuf = self
            .install_root
            .join("pkg")
            .join(go_platform())
            .join(import_path);
        let mut archive = pkg_dir.clone().into_os_string();
        archive.push(".a");
        let archive = PathBuf::from(archive);
        remove_if_exists(&pkg_dir, true)?;
        remove_if_exists(&archive, false)?;
        Ok(())
    }

    fn report(&mut self, import_path: &str, status: PackageStatus) {
        self.reporter.report(PackageEvent::new(import_path, status));
    }
}

#[cfg(test)]
#[path = "remove_test.rs"]
mod tests;
