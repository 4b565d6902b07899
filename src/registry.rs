//! パッケージレジストリ
//!
//! インストール済みノードの一覧。ImportPath で一意になる。
//! 永続化ファイル（`nodes.json`）は `{ImportPath, Type, Value}` の配列で、
//! 追加・更新後の挿入順を保つ。

use crate::error::{Result, SrcpmError};
use crate::node::Node;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// インストール済みノードの一覧
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    nodes: Vec<Node>,
    modified: bool,
}

impl Registry {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            modified: false,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[cfg(test)]
    pub fn get(&self, import_path: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.import_path == import_path)
    }

    /// ノードを追加または置換
    ///
    /// 同じ ImportPath があれば位置を保ったまま置き換え、無ければ末尾に追加する。
    /// Deps は保存しないので空にする。
    pub fn upsert(&mut self, mut node: Node) {
        node.deps.clear();
        match self
            .nodes
            .iter_mut()
            .find(|n| n.import_path == node.import_path)
        {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
        self.modified = true;
    }

    /// ノードを削除（存在しなければ何もしない）
    pub fn remove(&mut self, import_path: &str) -> Option<Node> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.import_path == import_path)?;
        self.modified = true;
        Some(self.nodes.remove(index))
    }

    /// 読み込み後に変更されたか
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// レジストリの永続化
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 読み込み（ファイルが無ければ空）
    pub fn load(&self) -> Result<Registry> {
        let nodes: Vec<Node> = match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                SrcpmError::Registry(format!("Failed to parse {}: {}", self.path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(SrcpmError::fs(&self.path)(e)),
        };
        Ok(Registry::new(nodes))
    }

    /// 保存（一時ファイルに書いてから置換）
    pub fn save(&self, registry: &Registry) -> Result<()> {
        let parent = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(SrcpmError::fs(parent))?;

        let mut temp_file = NamedTempFile::new_in(parent).map_err(SrcpmError::fs(parent))?;

        let content = serde_json::to_string_pretty(registry.nodes())?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(SrcpmError::fs(temp_file.path()))?;

        temp_file.persist(&self.path).map_err(|e| {
            SrcpmError::Registry(format!("Failed to persist {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(path = %self.path.display(), nodes = registry.len(), "saved registry");
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
