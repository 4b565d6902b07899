//! パッケージ取得
//!
//! 1つのノードについてリビジョン解決、アーカイブ取得、展開、インポートスキャンを行う。

use crate::archive::{extract_archive, DocFilter, ExtractOptions};
use crate::error::Result;
use crate::host::{MatchGroups, PackageHost};
use crate::node::Node;
use crate::resolve::{self, RevisionPlan};
use crate::scanner::ImportScanner;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 取得処理が参照する設定
pub struct FetchContext<'a> {
    pub install_root: &'a Path,
    pub extract: ExtractOptions,
    pub docs: &'a DocFilter,
    pub default_branches: &'a [String],
    pub scanner: &'a dyn ImportScanner,
}

impl FetchContext<'_> {
    /// プロジェクトのインストール先（`<root>/src/<project path>`）
    pub fn install_dir(&self, project_path: &str) -> PathBuf {
        self.install_root.join("src").join(project_path)
    }
}

/// 取得結果
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// リポジトリルートのインポートパス
    pub project_path: String,
    pub install_dir: PathBuf,
    pub sha: String,
    pub files_written: usize,
    /// 依存として見つかったインポートパス（重複なし、出現順）
    pub imports: Vec<String>,
}

/// ノードを取得して展開する
///
/// 成功するとノードの ImportPath はプロジェクトパスに、最新解決時は
/// Type/Value が commit/SHA に書き換わる。
pub async fn fetch_package(
    host: &dyn PackageHost,
    groups: &MatchGroups,
    node: &mut Node,
    ctx: &FetchContext<'_>,
) -> Result<FetchOutcome> {
    let (sha, scan_imports) = match resolve::plan(node)? {
        RevisionPlan::Latest { scan_imports } => {
            let refs = host.list_refs(groups).await?;
            let resolved = resolve::resolve_latest(&node.import_path, &refs, ctx.default_branches)?;
            tracing::debug!(
                import_path = %node.import_path,
                source = %resolved.source,
                sha = %resolved.sha,
                "resolved latest revision"
            );
            resolved.apply_to(node);
            (resolved.sha, scan_imports)
        }
        RevisionPlan::Explicit { sha } => (sha, false),
    };

    let archive = host.download_archive(groups, &sha).await?;

    let project_path = host.project_path(groups);
    node.import_path = project_path.clone();

    let install_dir = ctx.install_dir(&project_path);
    let report = extract_archive(&archive, &install_dir, ctx.extract, ctx.docs)?;

    let mut imports = Vec::new();
    if scan_imports {
        let mut seen = HashSet::new();
        for dir in &report.dirs {
            for path in ctx.scanner.scan(dir, &project_path)? {
                if seen.insert(path.clone()) {
                    imports.push(path);
                }
            }
        }
    }

    Ok(FetchOutcome {
        project_path,
        install_dir,
        sha,
        files_written: report.files_written,
        imports,
    })
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
