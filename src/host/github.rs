//! GitHub ホスト

use crate::config::AuthProvider;
use crate::error::Result;
use crate::host::{host_pattern_source, GitRef, HostFuture, HostKind, MatchGroups, PackageHost};
use crate::http::{self, Header};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

const REFS_URL: &str = "https://api.github.com/repos/{owner}/{repo}/git/refs";
const ARCHIVE_URL: &str = "https://github.com/{owner}/{repo}/archive/{sha}.zip";

/// `git/refs` APIのレスポンス要素
#[derive(Debug, Deserialize)]
struct RefEntry {
    #[serde(rename = "ref")]
    git_ref: String,
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

/// GitHub ホスト
pub struct GitHubHost {
    http: Client,
    token: Option<String>,
    pattern: Regex,
}

impl GitHubHost {
    /// 新しいGitHubHostを作成
    pub fn new(http: Client, auth: &AuthProvider) -> Result<Self> {
        Ok(Self {
            http,
            token: auth.token_for(HostKind::GitHub),
            pattern: Regex::new(&host_pattern_source(r"github\.com"))?,
        })
    }

    /// 認証ヘッダーを生成
    fn headers(&self) -> Vec<Header> {
        let mut headers = vec![("Accept", "application/vnd.github+json".to_string())];
        if let Some(token) = &self.token {
            headers.push(("Authorization", format!("Bearer {}", token)));
        }
        headers
    }
}

/// refs 一覧を GitRef に変換
fn into_git_refs(entries: Vec<RefEntry>) -> Vec<GitRef> {
    entries
        .into_iter()
        .map(|e| GitRef::new(e.git_ref, e.object.sha))
        .collect()
}

impl PackageHost for GitHubHost {
    fn kind(&self) -> HostKind {
        HostKind::GitHub
    }

    fn prefix(&self) -> &str {
        "github.com/"
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn list_refs<'a>(&'a self, groups: &'a MatchGroups) -> HostFuture<'a, Vec<GitRef>> {
        Box::pin(async move {
            let url = http::expand(REFS_URL, groups, &[]);
            let entries: Vec<RefEntry> =
                http::get_json(&self.http, &url, &self.headers(), "github").await?;
            Ok(into_git_refs(entries))
        })
    }

    fn download_archive<'a>(
        &'a self,
        groups: &'a MatchGroups,
        sha: &'a str,
    ) -> HostFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let url = http::expand(ARCHIVE_URL, groups, &[("sha", sha)]);
            let headers: Vec<Header> = self
                .token
                .iter()
                .map(|t| ("Authorization", format!("Bearer {}", t)))
                .collect();
            http::download_with_progress(&self.http, &url, &headers, "github").await
        })
    }
}

#[cfg(test)]
#[path = "github_test.rs"]
mod tests;
