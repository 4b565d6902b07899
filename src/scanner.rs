//! インポートスキャン
//!
//! 展開済みディレクトリのソースから外部パッケージのインポートパスを抽出する。

use crate::error::{Result, SrcpmError};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// インポートスキャナー trait
pub trait ImportScanner {
    /// `dir` 直下のソースが参照する外部インポートパスを返す
    ///
    /// `project_path` 自身とその配下は除外する。
    fn scan(&self, dir: &Path, project_path: &str) -> Result<Vec<String>>;
}

/// Go ソースの import 宣言を読むスキャナー
pub struct GoImportScanner {
    single: Regex,
    block: Regex,
    quoted: Regex,
}

impl GoImportScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            single: Regex::new(r#"(?m)^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#)?,
            block: Regex::new(r"(?ms)^\s*import\s*\((.*?)\)")?,
            quoted: Regex::new(r#""([^"]+)""#)?,
        })
    }

    /// ソース文字列からインポートパスを抽出（出現順）
    pub fn imports_in(&self, source: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();

        for caps in self.single.captures_iter(source) {
            if let Some(m) = caps.get(1) {
                found.push((m.start(), m.as_str().to_string()));
            }
        }
        for caps in self.block.captures_iter(source) {
            if let Some(body) = caps.get(1) {
                for q in self.quoted.captures_iter(body.as_str()) {
                    if let Some(m) = q.get(1) {
                        found.push((body.start() + m.start(), m.as_str().to_string()));
                    }
                }
            }
        }

        found.sort_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, path)| path).collect()
    }
}

/// 外部パッケージか（先頭要素にドットを含む）
fn is_remote(import_path: &str) -> bool {
    import_path
        .split('/')
        .next()
        .is_some_and(|first| first.contains('.'))
}

fn is_within(import_path: &str, project_path: &str) -> bool {
    import_path == project_path
        || import_path
            .strip_prefix(project_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

impl ImportScanner for GoImportScanner {
    fn scan(&self, dir: &Path, project_path: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut imports = Vec::new();

        let mut files: Vec<_> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(".go") && !n.ends_with("_test.go"))
            })
            .collect();
        files.sort();

        for file in files {
            let source = fs::read_to_string(&file).map_err(SrcpmError::fs(&file))?;
            for path in self.imports_in(&source) {
                if is_remote(&path) && !is_within(&path, project_path) && seen.insert(path.clone())
                {
                    imports.push(path);
                }
            }
        }

        tracing::debug!(dir = %dir.display(), count = imports.len(), "scanned imports");
        Ok(imports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SOURCE: &str = r#"package demo

import "fmt"

import (
	"os"
	yaml "gopkg.in/yaml.v2"
	"github.com/owner/repo/sub"
	_ "github.com/lib/pq"
)

import errs "github.com/pkg/errors"

func main() {
	fmt.Println("import \"not/real\"")
}
"#;

    #[test]
    fn test_imports_in_single_and_grouped() {
        let scanner = GoImportScanner::new().unwrap();
        assert_eq!(
            scanner.imports_in(SOURCE),
            vec![
                "fmt",
                "os",
                "gopkg.in/yaml.v2",
                "github.com/owner/repo/sub",
                "github.com/lib/pq",
                "github.com/pkg/errors",
            ]
        );
    }

    #[test]
    fn test_scan_filters_stdlib_self_and_tests() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.go"), SOURCE).unwrap();
        fs::write(
            temp_dir.path().join("a_test.go"),
            "package demo\nimport \"github.com/stretchr/testify\"\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("b.go"),
            "package demo\nimport \"github.com/lib/pq\"\n",
        )
        .unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(
            temp_dir.path().join("nested/c.go"),
            "package nested\nimport \"github.com/nested/only\"\n",
        )
        .unwrap();

        let scanner = GoImportScanner::new().unwrap();
        let imports = scanner
            .scan(temp_dir.path(), "github.com/owner/repo")
            .unwrap();

        assert_eq!(
            imports,
            vec!["gopkg.in/yaml.v2", "github.com/lib/pq", "github.com/pkg/errors"]
        );
    }

    #[test]
    fn test_is_within_boundary() {
        assert!(is_within("github.com/a/b", "github.com/a/b"));
        assert!(is_within("github.com/a/b/c", "github.com/a/b"));
        assert!(!is_within("github.com/a/bc", "github.com/a/b"));
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = GoImportScanner::new().unwrap();
        let imports = scanner
            .scan(&temp_dir.path().join("missing"), "github.com/a/b")
            .unwrap();
        assert!(imports.is_empty());
    }
}
