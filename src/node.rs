//! パッケージノード
//!
//! 要求された、または解決済みのパッケージ参照（インポートパス + リビジョン）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// バンドルメンバーを示す Value
///
/// 推移的依存を自動展開しない。1文字の Value はすべてマーカーとして扱う
/// （スナップショットは `"S"`）。
pub const BUNDLE_MARKER: &str = "B";

/// リビジョン種別
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// 未設定（最新を解決する）
    #[default]
    Unset,
    Tag,
    Commit,
    Branch,
    /// 永続化ファイルやバンドル定義に書かれた未知の種別
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Unset => "",
            NodeType::Tag => "tag",
            NodeType::Commit => "commit",
            NodeType::Branch => "branch",
            NodeType::Other(s) => s,
        }
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => NodeType::Unset,
            "tag" => NodeType::Tag,
            "commit" => NodeType::Commit,
            "branch" => NodeType::Branch,
            _ => NodeType::Other(value),
        }
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// パッケージノード
///
/// `value` が空なら最新リビジョンを解決し、推移的依存も辿る。
/// `deps` はバンドル定義の入れ子依存を表し、レジストリには保存しない。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "ImportPath")]
    pub import_path: String,
    #[serde(rename = "Type", default)]
    pub node_type: NodeType,
    #[serde(rename = "Value", default)]
    pub value: String,
    #[serde(rename = "Deps", default, skip_serializing)]
    pub deps: Vec<Node>,
}

impl Node {
    /// 最新リビジョンを要求するノード
    pub fn new(import_path: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            ..Self::default()
        }
    }

    /// リビジョン指定付きのノード
    pub fn pinned(import_path: impl Into<String>, node_type: NodeType, value: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            node_type,
            value: value.into(),
            deps: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_deps(mut self, deps: Vec<Node>) -> Self {
        self.deps = deps;
        self
    }

    /// 最新リビジョンを解決し、依存もスキャンする要求か
    pub fn wants_latest_with_deps(&self) -> bool {
        self.value.is_empty()
    }

    /// バンドル/スナップショットのマーカー値か
    pub fn is_marker(&self) -> bool {
        self.value.chars().count() == 1
    }

    /// リビジョンの表示用文字列
    pub fn revision_label(&self) -> String {
        if self.value.is_empty() {
            "latest".to_string()
        } else if self.node_type == NodeType::Unset {
            self.value.clone()
        } else {
            format!("{}: {}", self.node_type, self.value)
        }
    }
}
