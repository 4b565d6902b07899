//! ホスティングサービス
//!
//! インポートパスをホスティングサービスに振り分け、リビジョン一覧の取得と
//! アーカイブのダウンロードを各サービスに委ねる。

pub mod bitbucket;
pub mod github;
pub mod gitlab;

pub use bitbucket::BitbucketHost;
pub use github::GitHubHost;
pub use gitlab::GitLabHost;

use crate::config::{AuthProvider, HttpConfig};
use crate::error::{Result, SrcpmError};
use regex::Regex;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

/// ホストクライアントが返す Future
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// 名前付きキャプチャグループの正規表現ソース
///
/// `host` は正規表現エスケープ済みのホスト名。
pub(crate) fn host_pattern_source(host: &str) -> String {
    format!(
        r"^{}/(?P<owner>[a-z0-9A-Z_.\-]+)/(?P<repo>[a-z0-9A-Z_.\-]+)(?P<dir>/[a-z0-9A-Z_.\-/]*)?$",
        host
    )
}

/// ホスト種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    GitHub,
    GitLab,
    Bitbucket,
}

impl HostKind {
    /// ホスト名を返す
    pub fn as_str(&self) -> &'static str {
        match self {
            HostKind::GitHub => "github",
            HostKind::GitLab => "gitlab",
            HostKind::Bitbucket => "bitbucket",
        }
    }
}

impl std::fmt::Display for HostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Git ref（`refs/heads/*` または `refs/tags/*`）とコミットSHA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRef {
    pub name: String,
    pub sha: String,
}

impl GitRef {
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sha: sha.into(),
        }
    }

    /// ブランチ ref
    pub fn branch(name: &str, sha: impl Into<String>) -> Self {
        Self::new(format!("refs/heads/{}", name), sha)
    }

    /// タグ ref
    pub fn tag(name: &str, sha: impl Into<String>) -> Self {
        Self::new(format!("refs/tags/{}", name), sha)
    }
}

/// パターンにマッチしたインポートパスのキャプチャ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroups {
    groups: BTreeMap<String, String>,
}

impl MatchGroups {
    /// パターンのキャプチャから生成
    ///
    /// マッチしなかった任意グループは空文字列として保持する。
    fn from_captures(pattern: &Regex, import_path: &str) -> Option<Self> {
        let caps = pattern.captures(import_path)?;
        let groups = pattern
            .capture_names()
            .flatten()
            .map(|name| {
                let value = caps.name(name).map(|m| m.as_str()).unwrap_or_default();
                (name.to_string(), value.to_string())
            })
            .collect();

        Some(Self { groups })
    }

    /// テスト用に直接生成
    #[cfg(test)]
    pub fn new(owner: &str, repo: &str, dir: &str) -> Self {
        let groups = [("owner", owner), ("repo", repo), ("dir", dir)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { groups }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.groups.get(name).map(String::as_str)
    }

    pub fn owner(&self) -> &str {
        self.get("owner").unwrap_or_default()
    }

    pub fn repo(&self) -> &str {
        self.get("repo").unwrap_or_default()
    }

    /// リポジトリ内のサブパス（先頭 `/` 付き、無ければ空）
    #[cfg(test)]
    pub fn dir(&self) -> &str {
        self.get("dir").unwrap_or_default()
    }
}

/// パッケージホスト trait
///
/// 各サービスは独自のリビジョン一覧取得とアーカイブ取得のプロトコルを持つ。
pub trait PackageHost: Send + Sync {
    /// ホスト種別
    fn kind(&self) -> HostKind;

    /// インポートパスのプレフィックス（例: `github.com/`）
    fn prefix(&self) -> &str;

    /// owner/repo/dir の名前付きグループを持つパターン
    fn pattern(&self) -> &Regex;

    /// ブランチとタグの一覧を取得
    fn list_refs<'a>(&'a self, groups: &'a MatchGroups) -> HostFuture<'a, Vec<GitRef>>;

    /// 指定コミットのzipアーカイブをダウンロード
    fn download_archive<'a>(
        &'a self,
        groups: &'a MatchGroups,
        sha: &'a str,
    ) -> HostFuture<'a, Vec<u8>>;

    /// リポジトリルートのインポートパス
    fn project_path(&self, groups: &MatchGroups) -> String {
        format!("{}{}/{}", self.prefix(), groups.owner(), groups.repo())
    }
}

/// 登録順に並んだホスト一覧
pub struct HostRegistry {
    hosts: Vec<Box<dyn PackageHost>>,
}

impl HostRegistry {
    pub fn new(hosts: Vec<Box<dyn PackageHost>>) -> Self {
        Self { hosts }
    }

    /// GitHub, GitLab, Bitbucket の順に登録
    pub fn with_defaults(config: &HttpConfig, auth: &AuthProvider) -> Result<Self> {
        let client = config.build_client();
        Ok(Self::new(vec![
            Box::new(GitHubHost::new(client.clone(), auth)?),
            Box::new(GitLabHost::new(client.clone(), auth)?),
            Box::new(BitbucketHost::new(client, auth)?),
        ]))
    }

    /// インポートパスを分類
    ///
    /// プレフィックスが一致した最初のホストを選ぶ。パターンに合わなければ
    /// 下位のホストは試さず `NotFound` を返す。
    pub fn classify(&self, import_path: &str) -> Result<(&dyn PackageHost, MatchGroups)> {
        for host in &self.hosts {
            if !import_path.starts_with(host.prefix()) {
                continue;
            }

            let groups = MatchGroups::from_captures(host.pattern(), import_path)
                .ok_or_else(|| SrcpmError::NotFound(import_path.to_string()))?;

            tracing::debug!(import_path, host = %host.kind(), "classified");
            return Ok((host.as_ref(), groups));
        }

        Err(SrcpmError::InvalidImportPath(import_path.to_string()))
    }

}

#[cfg(test)]
pub mod mock;

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;

#[cfg(test)]
#[path = "host_proptests.rs"]
mod proptests;
