//! リビジョン解決
//!
//! ブランチとタグの一覧、または明示指定から取得するコミットを決める。
//!
//! ## タグの順序
//!
//! 1. 先頭の `v` / `V` を1文字だけ除去し、`.` で分割する
//! 2. 要素ごとに比較する。両方数値なら数値比較、数値は非数値より大きい、
//!    非数値同士は文字列比較
//! 3. 一方が他方の接頭辞なら要素数の多い方が大きい
//! 4. それでも同じなら元のタグ文字列で比較する
//!
//! 最大のタグを採用する。

use crate::error::{Result, SrcpmError};
use crate::host::GitRef;
use crate::node::{Node, NodeType};
use std::cmp::Ordering;
use std::collections::BTreeMap;

const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";

/// ブランチ名→コミット、タグ名→コミットに分けた ref 一覧
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefSet {
    pub branches: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

impl RefSet {
    /// `refs/heads/*` と `refs/tags/*` に振り分ける（それ以外は無視）
    pub fn partition(refs: &[GitRef]) -> Self {
        let mut set = Self::default();
        for r in refs {
            if let Some(name) = r.name.strip_prefix(HEADS_PREFIX) {
                set.branches.insert(name.to_string(), r.sha.clone());
            } else if let Some(name) = r.name.strip_prefix(TAGS_PREFIX) {
                set.tags.insert(name.to_string(), r.sha.clone());
            }
        }
        set
    }
}

/// 採用された ref の出所
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefSource {
    Tag(String),
    Branch(String),
}

impl std::fmt::Display for RefSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefSource::Tag(name) => write!(f, "tag {}", name),
            RefSource::Branch(name) => write!(f, "branch {}", name),
        }
    }
}

/// 解決済みリビジョン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRevision {
    pub source: RefSource,
    pub sha: String,
}

impl ResolvedRevision {
    /// ノードに記録する（Type = commit, Value = SHA）
    pub fn apply_to(&self, node: &mut Node) {
        node.node_type = NodeType::Commit;
        node.value = self.sha.clone();
    }
}

/// ノードに対する取得計画
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionPlan {
    /// ホストの ref 一覧から最新を選ぶ
    Latest { scan_imports: bool },
    /// 指定リビジョンをそのまま使う
    Explicit { sha: String },
}

/// ノードの Type/Value から取得計画を立てる
///
/// - Value が空: 最新を解決し、依存もスキャンする
/// - Value が1文字（バンドル/スナップショットのマーカー）: 最新を解決するがスキャンしない
/// - それ以外: Type が tag/commit/branch なら Value をそのまま使う
pub fn plan(node: &Node) -> Result<RevisionPlan> {
    if node.wants_latest_with_deps() {
        return Ok(RevisionPlan::Latest { scan_imports: true });
    }
    if node.is_marker() {
        return Ok(RevisionPlan::Latest {
            scan_imports: false,
        });
    }

    match node.node_type {
        NodeType::Tag | NodeType::Commit | NodeType::Branch => Ok(RevisionPlan::Explicit {
            sha: node.value.clone(),
        }),
        ref other => Err(SrcpmError::UnknownNodeType(other.as_str().to_string())),
    }
}

/// ref 一覧から最新リビジョンを選ぶ
///
/// タグがあれば最大のタグ、無ければデフォルトブランチ（候補順）、
/// ブランチが1つしか無ければそれを使う。
pub fn resolve_latest(
    import_path: &str,
    refs: &[GitRef],
    default_branches: &[String],
) -> Result<ResolvedRevision> {
    let set = RefSet::partition(refs);

    if let Some((tag, sha)) = best_tag(&set.tags) {
        return Ok(ResolvedRevision {
            source: RefSource::Tag(tag.to_string()),
            sha: sha.to_string(),
        });
    }

    let branch = default_branches
        .iter()
        .find_map(|name| set.branches.get_key_value(name.as_str()))
        .or_else(|| {
            if set.branches.len() == 1 {
                set.branches.iter().next()
            } else {
                None
            }
        });

    match branch {
        Some((name, sha)) => Ok(ResolvedRevision {
            source: RefSource::Branch(name.clone()),
            sha: sha.clone(),
        }),
        None => Err(SrcpmError::NotFound(format!(
            "{}: no tag or default branch to fetch",
            import_path
        ))),
    }
}

/// 最大のタグ（名前, コミット）
pub fn best_tag(tags: &BTreeMap<String, String>) -> Option<(&str, &str)> {
    tags.iter()
        .max_by(|(a, _), (b, _)| compare_tags(a, b))
        .map(|(name, sha)| (name.as_str(), sha.as_str()))
}

/// タグの全順序
pub fn compare_tags(a: &str, b: &str) -> Ordering {
    let left = tag_components(a);
    let right = tag_components(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = compare_component(l, r);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

fn tag_components(tag: &str) -> Vec<&str> {
    let trimmed = tag
        .strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag);
    trimmed.split('.').collect()
}

fn compare_component(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
