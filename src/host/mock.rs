//! テスト用モックホスト

use super::*;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 呼び出し回数の記録
#[derive(Debug, Default)]
pub struct CallLog {
    list_refs: AtomicUsize,
    downloads: AtomicUsize,
}

impl CallLog {
    pub fn list_refs(&self) -> usize {
        self.list_refs.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// ネットワークアクセスの総数
    pub fn total(&self) -> usize {
        self.list_refs() + self.downloads()
    }
}

/// テスト用モックホスト
///
/// `owner/repo` ごとの ref 一覧と、SHA ごとのアーカイブを返す。
pub struct MockHost {
    kind: HostKind,
    prefix: String,
    pattern: Regex,
    refs: HashMap<String, Vec<GitRef>>,
    archives: HashMap<String, Vec<u8>>,
    log: Arc<CallLog>,
}

impl MockHost {
    pub fn new(kind: HostKind, prefix: &str) -> Self {
        let host = regex::escape(prefix.trim_end_matches('/'));
        Self {
            kind,
            prefix: prefix.to_string(),
            pattern: Regex::new(&host_pattern_source(&host)).unwrap(),
            refs: HashMap::new(),
            archives: HashMap::new(),
            log: Arc::new(CallLog::default()),
        }
    }

    pub fn github() -> Self {
        Self::new(HostKind::GitHub, "github.com/")
    }

    /// リポジトリの ref 一覧を登録
    pub fn with_refs(mut self, owner_repo: &str, refs: Vec<GitRef>) -> Self {
        self.refs.insert(owner_repo.to_string(), refs);
        self
    }

    /// SHA に対するアーカイブを登録
    pub fn with_archive(mut self, sha: &str, archive: Vec<u8>) -> Self {
        self.archives.insert(sha.to_string(), archive);
        self
    }

    /// 最新が `sha` の master ブランチだけを持つリポジトリを登録
    pub fn with_repo(self, owner_repo: &str, sha: &str, files: &[(&str, &str)]) -> Self {
        let root = format!("{}-{}", owner_repo.rsplit('/').next().unwrap_or("repo"), sha);
        let entries: Vec<(String, &str)> = std::iter::once((format!("{}/", root), ""))
            .chain(files.iter().map(|(p, c)| (format!("{}/{}", root, p), *c)))
            .collect();
        let entries: Vec<(&str, &str)> = entries.iter().map(|(p, c)| (p.as_str(), *c)).collect();
        self.with_refs(owner_repo, vec![GitRef::branch("master", sha)])
            .with_archive(sha, zip_archive(&entries))
    }

    pub fn log(&self) -> Arc<CallLog> {
        Arc::clone(&self.log)
    }

    fn not_found(&self, what: &str) -> SrcpmError {
        SrcpmError::HostApi {
            host: self.kind.to_string(),
            status: 404,
            message: format!("{} not found", what),
        }
    }
}

impl PackageHost for MockHost {
    fn kind(&self) -> HostKind {
        self.kind
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn list_refs<'a>(&'a self, groups: &'a MatchGroups) -> HostFuture<'a, Vec<GitRef>> {
        Box::pin(async move {
            self.log.list_refs.fetch_add(1, Ordering::SeqCst);
            let key = format!("{}/{}", groups.owner(), groups.repo());
            self.refs
                .get(&key)
                .cloned()
                .ok_or_else(|| self.not_found(&key))
        })
    }

    fn download_archive<'a>(
        &'a self,
        _groups: &'a MatchGroups,
        sha: &'a str,
    ) -> HostFuture<'a, Vec<u8>> {
        Box::pin(async move {
            self.log.downloads.fetch_add(1, Ordering::SeqCst);
            self.archives
                .get(sha)
                .cloned()
                .ok_or_else(|| self.not_found(sha))
        })
    }
}

/// テスト用のzipアーカイブを作成するヘルパー
///
/// 末尾が `/` のエントリはディレクトリとして追加する。
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        for (path, content) in entries {
            if path.ends_with('/') {
                zip.add_directory(*path, options).unwrap();
            } else {
                zip.start_file(*path, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
    }
    buf
}
