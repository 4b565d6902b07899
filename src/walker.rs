//! 依存解決
//!
//! 要求されたパス、バンドル、取得後に見つかったインポートを再帰的に辿り、
//! 取得結果をレジストリに反映する。
//!
//! 1回の実行ごとにダウンロードキャッシュを持ち、同じパスは一度しか処理しない。
//! 1つのパスの失敗は報告するだけで、残りの要求は続行する。
//! バンドルの確認を拒否した場合のみ実行全体を中断する。

use crate::bundle::{self, BundleStore, Request};
use crate::error::{ErrorKind, SrcpmError};
use crate::fetch::{fetch_package, FetchContext};
use crate::host::HostRegistry;
use crate::node::Node;
use crate::output::{PackageEvent, PackageStatus, Reporter};
use crate::prompt::Confirm;
use crate::registry::Registry;
use crate::vcs::{self, VcsDelegate};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

/// 処理を続けるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// バンドルの確認が拒否された
    Cancelled,
}

type WalkFuture<'s> = Pin<Box<dyn Future<Output = Flow> + 's>>;

/// バンドルメンバーの表示用文字列
pub(crate) fn member_labels(members: &[Node]) -> Vec<String> {
    members
        .iter()
        .map(|n| format!("[{}] -> {}", n.import_path, n.revision_label()))
        .collect()
}

/// 1回の実行のセッション
pub struct Session<'a> {
    hosts: &'a HostRegistry,
    fetch: FetchContext<'a>,
    bundles: &'a BundleStore,
    registry: &'a mut Registry,
    reporter: &'a mut dyn Reporter,
    confirm: &'a mut dyn Confirm,
    delegate: Option<&'a mut dyn VcsDelegate>,
    download_cache: HashSet<String>,
}

impl<'a> Session<'a> {
    pub fn new(
        hosts: &'a HostRegistry,
        fetch: FetchContext<'a>,
        bundles: &'a BundleStore,
        registry: &'a mut Registry,
        reporter: &'a mut dyn Reporter,
        confirm: &'a mut dyn Confirm,
    ) -> Self {
        Self {
            hosts,
            fetch,
            bundles,
            registry,
            reporter,
            confirm,
            delegate: None,
            download_cache: HashSet::new(),
        }
    }

    /// VCS ツールへの委譲を有効にする
    pub fn with_delegate(mut self, delegate: &'a mut dyn VcsDelegate) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// 処理済みのインポートパスか
    pub fn is_cached(&self, import_path: &str) -> bool {
        self.download_cache.contains(import_path)
    }

    /// コマンドライン引数を処理する
    pub async fn install(&mut self, requests: &[String]) -> Flow {
        let nodes = requests.iter().map(Node::new).collect();
        self.walk(nodes).await
    }

    /// ノード列を順に処理する
    pub fn walk(&mut self, nodes: Vec<Node>) -> WalkFuture<'_> {
        Box::pin(async move {
            for node in nodes {
                let flow = match Request::parse(&node.import_path) {
                    Request::Bundle(name) => {
                        let name = name.to_string();
                        self.walk_bundle(&name).await
                    }
                    Request::Snapshot(name) => {
                        self.report_snapshot(name);
                        Flow::Continue
                    }
                    Request::Path(_) => self.install_node(node).await,
                };
                if flow == Flow::Cancelled {
                    return Flow::Cancelled;
                }
            }
            Flow::Continue
        })
    }

    async fn walk_bundle(&mut self, name: &str) -> Flow {
        let label = format!("{}{}", name, bundle::BUNDLE_SUFFIX);
        let members = match self.bundles.expand(name) {
            Ok(members) => members,
            Err(_) => {
                self.report(&label, PackageStatus::BundleNotFound);
                return Flow::Continue;
            }
        };

        self.report(&label, PackageStatus::BundleExpanded(member_labels(&members)));
        let message = format!("Continue installing bundle '{}'?", name);
        if !self.confirm.confirm(&message) {
            return Flow::Cancelled;
        }

        self.walk(members).await
    }

    fn report_snapshot(&mut self, name: &str) {
        if let Err(e) = bundle::expand_snapshot(name) {
            tracing::debug!(error = %e, "snapshot request");
            self.report(
                &format!("{}{}", name, bundle::SNAPSHOT_SUFFIX),
                PackageStatus::SnapshotUnsupported,
            );
        }
    }

    /// 1つのインポートパスを処理する
    async fn install_node(&mut self, mut node: Node) -> Flow {
        let requested = node.import_path.clone();
        if self.is_cached(&requested) {
            self.report(&requested, PackageStatus::SkippedDuplicate);
            return Flow::Continue;
        }

        let hosts = self.hosts;
        let (host, groups) = match hosts.classify(&requested) {
            Ok(found) => found,
            Err(e) if e.kind() == ErrorKind::InvalidPath => {
                self.report(&requested, PackageStatus::SkippedInvalid);
                return Flow::Continue;
            }
            Err(e) => {
                // 既知ホスト配下の不正パスは再要求されても重複として扱う
                self.download_cache.insert(requested.clone());
                self.fail(&requested, &e);
                return Flow::Continue;
            }
        };

        if self.try_delegate(&requested) {
            return Flow::Continue;
        }

        self.download_cache.insert(requested.clone());
        let project_path = host.project_path(&groups);
        if project_path != requested && !self.download_cache.insert(project_path) {
            self.report(&requested, PackageStatus::SkippedDuplicate);
            return Flow::Continue;
        }

        let outcome = match fetch_package(host, &groups, &mut node, &self.fetch).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.fail(&requested, &e);
                return Flow::Continue;
            }
        };

        tracing::debug!(dir = %outcome.install_dir.display(), "extracted");
        self.report(
            &outcome.project_path,
            PackageStatus::Installed {
                sha: outcome.sha.clone(),
                files: outcome.files_written,
            },
        );

        if !outcome.imports.is_empty() {
            tracing::debug!(
                import_path = %outcome.project_path,
                imports = ?outcome.imports,
                "discovered dependencies"
            );
            let deps = outcome.imports.into_iter().map(Node::new).collect();
            if self.walk(deps).await == Flow::Cancelled {
                return Flow::Cancelled;
            }
        }

        self.registry.upsert(node);
        Flow::Continue
    }

    /// 委譲した場合 true
    fn try_delegate(&mut self, import_path: &str) -> bool {
        let Some(delegate) = self.delegate.as_deref_mut() else {
            return false;
        };
        if vcs::should_delegate(true, import_path, delegate).is_none() {
            return false;
        }

        self.download_cache.insert(import_path.to_string());
        match delegate.delegate(import_path) {
            Ok(()) => self.report(import_path, PackageStatus::Delegated),
            Err(e) => self.fail(import_path, &e),
        }
        true
    }

    fn fail(&mut self, import_path: &str, error: &SrcpmError) {
        tracing::warn!(import_path, kind = ?error.kind(), error = %error, "package failed");
        self.report(import_path, PackageStatus::Failed(error.to_string()));
    }

    fn report(&mut self, import_path: &str, status: PackageStatus) {
        self.reporter.report(PackageEvent::new(import_path, status));
    }
}

#[cfg(test)]
#[path = "walker_test.rs"]
mod tests;
