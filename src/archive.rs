//! アーカイブ展開
//!
//! ダウンロードしたzipアーカイブをフィルタしながらインストール先に展開する。
//! 展開は同じ親ディレクトリの一時ディレクトリで行い、全エントリの書き込みが
//! 成功した時点でインストール先と入れ替える。既存のインストールは入れ替え後に削除する。

use crate::error::{Result, SrcpmError};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use zip::ZipArchive;

/// ドキュメントファイル判定のデフォルトパターン
pub const DEFAULT_DOC_PATTERNS: &[&str] = &[
    "*.md",
    "*.txt",
    "*.rst",
    "README*",
    "LICENSE*",
    "AUTHORS*",
    "CONTRIBUTORS*",
    "doc.go",
];

/// サンプルコードとみなすディレクトリ名
const EXAMPLE_SEGMENT: &str = "example";

/// ドキュメントファイル判定（ファイル名に対する glob）
#[derive(Debug, Clone)]
pub struct DocFilter {
    patterns: Vec<glob::Pattern>,
}

impl DocFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p.as_ref()).map_err(|e| {
                    SrcpmError::Config(format!("Invalid doc pattern {:?}: {}", p.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_doc_file(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(file_name))
    }
}

impl Default for DocFilter {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_DOC_PATTERNS
                .iter()
                .filter_map(|p| glob::Pattern::new(p).ok())
                .collect(),
        }
    }
}

/// 展開オプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// ドキュメントファイルのみ展開
    pub docs_only: bool,
    /// `example` ディレクトリも展開
    pub include_examples: bool,
}

/// 展開結果
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    /// インポートスキャン対象のディレクトリ（先頭はインストール先自身）
    pub dirs: Vec<PathBuf>,
    /// 書き込んだファイル数
    pub files_written: usize,
    /// スキップしたファイル数
    pub files_skipped: usize,
}

/// アーカイブ内のルートフォルダ名（最初のエントリの先頭要素）
fn root_prefix(zip: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String> {
    if zip.is_empty() {
        return Ok(String::new());
    }
    let first = zip.by_index(0)?;
    let name = first.name().replace('\\', "/");
    Ok(name
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| format!("{}/", s))
        .unwrap_or_default())
}

/// 相対パスが Normal 要素のみで構成されるか（zip-slip 対策）
fn is_safe_relative(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

fn zip_mtime(dt: zip::DateTime) -> Option<SystemTime> {
    let date = NaiveDate::from_ymd_opt(dt.year().into(), dt.month().into(), dt.day().into())?;
    let time = date.and_hms_opt(dt.hour().into(), dt.minute().into(), dt.second().into())?;
    Some(SystemTime::from(time.and_utc()))
}

/// アーカイブをインストール先に展開
///
/// ルートフォルダ名をインストール先に置き換えて各エントリを振り分ける。
/// - ディレクトリ: スキャン対象として記録（`example` は除外）
/// - ファイル: 隠しファイル、`example` 配下、docs_only 時の非ドキュメントはスキップ
///
/// 途中で失敗した場合、既存のインストール先には手を付けない。
pub fn extract_archive(
    archive: &[u8],
    dest: &Path,
    options: ExtractOptions,
    docs: &DocFilter,
) -> Result<ExtractReport> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    let prefix = root_prefix(&mut zip)?;

    let parent = dest
        .parent()
        .ok_or_else(|| SrcpmError::Config(format!("Invalid install path: {}", dest.display())))?;
    fs::create_dir_all(parent).map_err(SrcpmError::fs(parent))?;

    let staging = tempfile::Builder::new()
        .prefix(".srcpm-")
        .tempdir_in(parent)
        .map_err(SrcpmError::fs(parent))?;

    let mut report = ExtractReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut rel_dirs: Vec<String> = Vec::new();
    let mut record_dir = |rel: &str| {
        if !rel.is_empty() && seen.insert(rel.to_string()) {
            rel_dirs.push(rel.to_string());
        }
    };

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let name = entry.name().replace('\\', "/");

        let relative = name.strip_prefix(&prefix).unwrap_or(&name);
        let relative = relative.trim_end_matches('/');
        if relative.is_empty() {
            continue;
        }
        if !is_safe_relative(relative) {
            tracing::warn!(entry = %name, "skipping unsafe archive entry");
            report.files_skipped += 1;
            continue;
        }

        let segments: Vec<&str> = relative.split('/').collect();
        let in_example = !options.include_examples && segments.contains(&EXAMPLE_SEGMENT);
        let hidden = segments.iter().any(|s| s.starts_with('.'));

        if entry.is_dir() {
            if !in_example && !hidden {
                record_dir(relative);
            }
            continue;
        }

        let file_name = segments.last().copied().unwrap_or_default();
        if in_example || hidden || (options.docs_only && !docs.is_doc_file(file_name)) {
            report.files_skipped += 1;
            continue;
        }

        let target = staging.path().join(relative);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(SrcpmError::fs(dir))?;
        }
        let mut out = File::create(&target).map_err(SrcpmError::fs(&target))?;
        io::copy(&mut entry, &mut out).map_err(SrcpmError::fs(&target))?;

        if let Some(mtime) = entry.last_modified().and_then(zip_mtime) {
            out.set_modified(mtime).map_err(SrcpmError::fs(&target))?;
        }
        report.files_written += 1;

        if let Some((dir, _)) = relative.rsplit_once('/') {
            record_dir(dir);
        }
    }

    replace_dir(staging, dest)?;

    report.dirs = std::iter::once(dest.to_path_buf())
        .chain(rel_dirs.iter().map(|rel| dest.join(rel)))
        .collect();

    tracing::debug!(
        dest = %dest.display(),
        written = report.files_written,
        skipped = report.files_skipped,
        "extracted archive"
    );
    Ok(report)
}

/// 展開済みの一時ディレクトリをインストール先と入れ替える
fn replace_dir(staging: tempfile::TempDir, dest: &Path) -> Result<()> {
    let backup = if dest.exists() {
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let backup = dest.with_file_name(format!(".{}.srcpm-old", name));
        if backup.exists() {
            fs::remove_dir_all(&backup).map_err(SrcpmError::fs(&backup))?;
        }
        fs::rename(dest, &backup).map_err(SrcpmError::fs(dest))?;
        Some(backup)
    } else {
        None
    };

    let staged = staging.keep();
    if let Err(e) = fs::rename(&staged, dest) {
        if let Some(backup) = &backup {
            let _ = fs::rename(backup, dest);
        }
        let _ = fs::remove_dir_all(&staged);
        return Err(SrcpmError::fs(dest)(e));
    }

    if let Some(backup) = backup {
        if let Err(e) = fs::remove_dir_all(&backup) {
            tracing::warn!(path = %backup.display(), error = %e, "failed to remove previous install");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "archive_test.rs"]
mod tests;
