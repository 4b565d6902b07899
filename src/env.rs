//! 環境変数ユーティリティ

use std::path::PathBuf;

/// 環境変数ユーティリティ
pub struct EnvVar;

impl EnvVar {
    /// 環境変数を取得（空文字列はNoneとして扱う）
    pub fn get(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.is_empty())
    }

    /// パスとして取得
    pub fn get_path(key: &str) -> Option<PathBuf> {
        Self::get(key).map(PathBuf::from)
    }

    /// パスリスト（GOPATH 形式）の先頭要素を取得
    ///
    /// 区切り文字はプラットフォームに従う（Unix は `:`、Windows は `;`）。
    pub fn first_path_in_list(key: &str) -> Option<PathBuf> {
        let value = std::env::var_os(key)?;
        std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty())
    }

    /// ホームディレクトリ
    pub fn home_dir() -> Option<PathBuf> {
        Self::get_path("HOME").or_else(|| Self::get_path("USERPROFILE"))
    }
}

#[cfg(test)]
#[path = "env_test.rs"]
mod tests;
