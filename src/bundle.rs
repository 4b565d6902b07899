//! バンドル
//!
//! 名前付きのパッケージ要求の集合。`bundles.json` から読み込む読み取り専用データ。

use crate::error::{Result, SrcpmError};
use crate::node::{Node, BUNDLE_MARKER};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// バンドル要求の接尾辞
pub const BUNDLE_SUFFIX: &str = ".b";

/// スナップショット要求の接尾辞
pub const SNAPSHOT_SUFFIX: &str = ".s";

/// バンドル定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Nodes", default)]
    pub nodes: Vec<Node>,
}

impl Bundle {
    /// メンバーを入れ子の依存ごと平坦化する
    ///
    /// リビジョン未指定のメンバーには Value にバンドルマーカーを設定する。
    pub fn expand(&self) -> Vec<Node> {
        let mut flat = Vec::new();
        flatten_into(&self.nodes, &mut flat);
        flat
    }
}

fn flatten_into(nodes: &[Node], out: &mut Vec<Node>) {
    for node in nodes {
        let mut member = Node::pinned(&node.import_path, node.node_type.clone(), &node.value);
        if member.value.is_empty() {
            member.value = BUNDLE_MARKER.to_string();
        }
        out.push(member);
        flatten_into(&node.deps, out);
    }
}

/// 要求の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    /// `<name>.b`
    Bundle(&'a str),
    /// `<name>.s`
    Snapshot(&'a str),
    /// インポートパス
    Path(&'a str),
}

impl<'a> Request<'a> {
    pub fn parse(raw: &'a str) -> Self {
        if let Some(name) = raw.strip_suffix(BUNDLE_SUFFIX) {
            Request::Bundle(name)
        } else if let Some(name) = raw.strip_suffix(SNAPSHOT_SUFFIX) {
            Request::Snapshot(name)
        } else {
            Request::Path(raw)
        }
    }
}

/// ローカルのバンドル定義一覧
#[derive(Debug, Clone, Default)]
pub struct BundleStore {
    bundles: Vec<Bundle>,
}

impl BundleStore {
    #[cfg(test)]
    pub fn new(bundles: Vec<Bundle>) -> Self {
        Self { bundles }
    }

    /// 読み込み（ファイルが無ければ空）
    pub fn load(path: &Path) -> Result<Self> {
        let bundles = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                SrcpmError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(SrcpmError::fs(path)(e)),
        };
        Ok(Self { bundles })
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn find(&self, name: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.name == name)
    }

    /// バンドル名からメンバーを展開
    pub fn expand(&self, name: &str) -> Result<Vec<Node>> {
        self.find(name)
            .map(Bundle::expand)
            .ok_or_else(|| SrcpmError::NotFound(format!("bundle {}", name)))
    }
}

/// スナップショットの展開（リモート参照は未実装）
pub fn expand_snapshot(name: &str) -> Result<Vec<Node>> {
    Err(SrcpmError::SnapshotUnsupported(name.to_string()))
}
