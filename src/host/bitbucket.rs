//! Bitbucket ホスト

use crate::config::AuthProvider;
use crate::error::Result;
use crate::host::{host_pattern_source, GitRef, HostFuture, HostKind, MatchGroups, PackageHost};
use crate::http::{self, Header};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

const REFS_URL: &str = "https://api.bitbucket.org/2.0/repositories/{owner}/{repo}/refs?pagelen=100";
const ARCHIVE_URL: &str = "https://bitbucket.org/{owner}/{repo}/get/{sha}.zip";

/// refs APIのページ
#[derive(Debug, Deserialize)]
struct RefPage {
    #[serde(default)]
    values: Vec<RefEntry>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefEntry {
    name: String,
    #[serde(rename = "type")]
    ref_type: String,
    target: RefTarget,
}

#[derive(Debug, Deserialize)]
struct RefTarget {
    hash: String,
}

/// Bitbucket ホスト
pub struct BitbucketHost {
    http: Client,
    token: Option<String>,
    pattern: Regex,
}

impl BitbucketHost {
    pub fn new(http: Client, auth: &AuthProvider) -> Result<Self> {
        Ok(Self {
            http,
            token: auth.token_for(HostKind::Bitbucket),
            pattern: Regex::new(&host_pattern_source(r"bitbucket\.org"))?,
        })
    }

    fn headers(&self) -> Vec<Header> {
        self.token
            .iter()
            .map(|t| ("Authorization", format!("Bearer {}", t)))
            .collect()
    }
}

/// ページ内の ref を GitRef に変換（branch/tag 以外は無視）
fn into_git_refs(entries: Vec<RefEntry>) -> Vec<GitRef> {
    entries
        .into_iter()
        .filter_map(|e| match e.ref_type.as_str() {
            "branch" | "named_branch" => Some(GitRef::branch(&e.name, e.target.hash)),
            "tag" => Some(GitRef::tag(&e.name, e.target.hash)),
            _ => None,
        })
        .collect()
}

impl PackageHost for BitbucketHost {
    fn kind(&self) -> HostKind {
        HostKind::Bitbucket
    }

    fn prefix(&self) -> &str {
        "bitbucket.org/"
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn list_refs<'a>(&'a self, groups: &'a MatchGroups) -> HostFuture<'a, Vec<GitRef>> {
        Box::pin(async move {
            let headers = self.headers();
            let mut refs = Vec::new();
            let mut next = Some(http::expand(REFS_URL, groups, &[]));

            while let Some(url) = next {
                let page: RefPage = http::get_json(&self.http, &url, &headers, "bitbucket").await?;
                refs.extend(into_git_refs(page.values));
                next = page.next;
            }

            Ok(refs)
        })
    }

    fn download_archive<'a>(
        &'a self,
        groups: &'a MatchGroups,
        sha: &'a str,
    ) -> HostFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let url = http::expand(ARCHIVE_URL, groups, &[("sha", sha)]);
            http::download_with_progress(&self.http, &url, &self.headers(), "bitbucket").await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_git_refs_filters_types() {
        let page: RefPage = serde_json::from_str(
            r#"{
                "values": [
                    {"name": "default", "type": "branch", "target": {"hash": "aaa"}},
                    {"name": "1.2", "type": "tag", "target": {"hash": "bbb"}},
                    {"name": "weird", "type": "bookmark", "target": {"hash": "ccc"}}
                ],
                "next": "https://api.bitbucket.org/2.0/repositories/o/r/refs?page=2"
            }"#,
        )
        .unwrap();

        assert!(page.next.is_some());
        assert_eq!(
            into_git_refs(page.values),
            vec![GitRef::branch("default", "aaa"), GitRef::tag("1.2", "bbb")]
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page: RefPage = serde_json::from_str(r#"{"values": []}"#).unwrap();
        assert!(page.next.is_none());
    }

    #[test]
    fn test_archive_url() {
        let groups = MatchGroups::new("o", "r", "");
        assert_eq!(
            http::expand(ARCHIVE_URL, &groups, &[("sha", "f00")]),
            "https://bitbucket.org/o/r/get/f00.zip"
        );
    }
}
