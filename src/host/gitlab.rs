//! GitLab ホスト

use crate::config::AuthProvider;
use crate::error::Result;
use crate::host::{host_pattern_source, GitRef, HostFuture, HostKind, MatchGroups, PackageHost};
use crate::http::{self, Header};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

const PROJECT_API: &str = "https://gitlab.com/api/v4/projects/{owner}%2F{repo}";
const NEXT_PAGE_HEADER: &str = "X-Next-Page";

/// branches / tags APIのレスポンス要素
#[derive(Debug, Deserialize)]
struct RefEntry {
    name: String,
    commit: CommitEntry,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    id: String,
}

/// GitLab ホスト
pub struct GitLabHost {
    http: Client,
    token: Option<String>,
    pattern: Regex,
}

impl GitLabHost {
    pub fn new(http: Client, auth: &AuthProvider) -> Result<Self> {
        Ok(Self {
            http,
            token: auth.token_for(HostKind::GitLab),
            pattern: Regex::new(&host_pattern_source(r"gitlab\.com"))?,
        })
    }

    fn headers(&self) -> Vec<Header> {
        self.token
            .iter()
            .map(|t| ("PRIVATE-TOKEN", t.clone()))
            .collect()
    }

    /// `X-Next-Page` を辿って全ページを取得
    async fn fetch_refs(&self, groups: &MatchGroups, kind: &str) -> Result<Vec<RefEntry>> {
        let template = format!("{}/repository/{}?per_page=100&page={{page}}", PROJECT_API, kind);
        let headers = self.headers();
        let mut entries = Vec::new();
        let mut page = Some("1".to_string());

        while let Some(current) = page {
            let url = http::expand(&template, groups, &[("page", current.as_str())]);
            let (batch, next): (Vec<RefEntry>, _) =
                http::get_json_with_header(&self.http, &url, &headers, "gitlab", NEXT_PAGE_HEADER)
                    .await?;
            entries.extend(batch);
            page = next_page(&current, next);
        }
        Ok(entries)
    }
}

/// 次のページ番号（同じページを指す場合は打ち切る）
fn next_page(current: &str, header: Option<String>) -> Option<String> {
    header.filter(|next| next != current)
}

/// branches と tags を GitRef に変換
fn into_git_refs(branches: Vec<RefEntry>, tags: Vec<RefEntry>) -> Vec<GitRef> {
    let branches = branches
        .into_iter()
        .map(|b| GitRef::branch(&b.name, b.commit.id));
    let tags = tags.into_iter().map(|t| GitRef::tag(&t.name, t.commit.id));
    branches.chain(tags).collect()
}

impl PackageHost for GitLabHost {
    fn kind(&self) -> HostKind {
        HostKind::GitLab
    }

    fn prefix(&self) -> &str {
        "gitlab.com/"
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn list_refs<'a>(&'a self, groups: &'a MatchGroups) -> HostFuture<'a, Vec<GitRef>> {
        Box::pin(async move {
            let branches = self.fetch_refs(groups, "branches").await?;
            let tags = self.fetch_refs(groups, "tags").await?;
            Ok(into_git_refs(branches, tags))
        })
    }

    fn download_archive<'a>(
        &'a self,
        groups: &'a MatchGroups,
        sha: &'a str,
    ) -> HostFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let url = http::expand(
                &format!("{}/repository/archive.zip?sha={{sha}}", PROJECT_API),
                groups,
                &[("sha", sha)],
            );
            http::download_with_progress(&self.http, &url, &self.headers(), "gitlab").await
        })
    }
}
