//! 設定
//!
//! HTTP設定、認証プロバイダー、`config.toml` から読み込むユーザー設定、
//! データディレクトリとインストールルートの解決を扱う。

use crate::env::EnvVar;
use crate::error::{Result, SrcpmError};
use crate::host::HostKind;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// デフォルトのUser-Agent
pub const DEFAULT_USER_AGENT: &str = "srcpm-cli";

/// HTTP設定
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// 接続と読み取りの停止タイムアウト
    ///
    /// リクエスト全体の時間は制限しない（大きなアーカイブのダウンロードを打ち切らない）。
    pub stall_timeout: Option<Duration>,
    /// User-Agent
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            stall_timeout: Some(Duration::from_secs(30)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    /// reqwest::Client を構築
    pub fn build_client(&self) -> Client {
        let mut builder = Client::builder().user_agent(&self.user_agent);

        if let Some(timeout) = self.stall_timeout {
            builder = builder.connect_timeout(timeout).read_timeout(timeout);
        }

        builder.build().unwrap_or_else(|_| Client::new())
    }
}

/// 認証プロバイダー
///
/// 優先順位: 明示的なトークン > 環境変数 > CLI（GitHubのみ）
#[derive(Debug, Clone, Default)]
pub struct AuthProvider {
    github_token: Option<String>,
    gitlab_token: Option<String>,
    bitbucket_token: Option<String>,
}

impl AuthProvider {
    /// 新しいAuthProviderを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// GitHubトークンを設定
    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    /// GitLabトークンを設定
    pub fn with_gitlab_token(mut self, token: impl Into<String>) -> Self {
        self.gitlab_token = Some(token.into());
        self
    }

    /// Bitbucketトークンを設定
    pub fn with_bitbucket_token(mut self, token: impl Into<String>) -> Self {
        self.bitbucket_token = Some(token.into());
        self
    }

    /// 明示的に設定されたトークン
    pub fn explicit_token(&self, host: HostKind) -> Option<&str> {
        match host {
            HostKind::GitHub => self.github_token.as_deref(),
            HostKind::GitLab => self.gitlab_token.as_deref(),
            HostKind::Bitbucket => self.bitbucket_token.as_deref(),
        }
    }

    /// ホストのトークンを解決
    pub fn token_for(&self, host: HostKind) -> Option<String> {
        if let Some(token) = self.explicit_token(host) {
            return Some(token.to_string());
        }

        let var = match host {
            HostKind::GitHub => "GITHUB_TOKEN",
            HostKind::GitLab => "GITLAB_TOKEN",
            HostKind::Bitbucket => "BITBUCKET_TOKEN",
        };
        if let Some(token) = EnvVar::get(var) {
            return Some(token);
        }

        match host {
            HostKind::GitHub => github_token_from_cli(),
            _ => None,
        }
    }
}

/// gh CLIからトークンを取得（ローカル開発用）
fn github_token_from_cli() -> Option<String> {
    Command::new("gh")
        .args(["auth", "token"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `config.toml` の `[http]` セクション
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `config.toml` の `[auth]` セクション
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub github_token: Option<String>,
    pub gitlab_token: Option<String>,
    pub bitbucket_token: Option<String>,
}

/// ユーザー設定（`config.toml`）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// パッケージの展開先ルート（`<root>/src/<project>`）
    pub install_root: Option<PathBuf>,
    /// タグが無い場合に使うブランチ名（優先順）
    pub default_branches: Vec<String>,
    /// ドキュメントファイル判定用の glob パターン
    pub doc_patterns: Vec<String>,
    pub http: HttpSettings,
    pub auth: AuthSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            install_root: None,
            default_branches: vec!["master".to_string(), "main".to_string()],
            doc_patterns: crate::archive::DEFAULT_DOC_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            http: HttpSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

impl Settings {
    /// 設定ファイルを読み込む（存在しなければデフォルト）
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                SrcpmError::Config(format!("Failed to parse {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SrcpmError::fs(path)(e)),
        }
    }

    /// HTTP設定
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            stall_timeout: (self.http.timeout_secs > 0)
                .then(|| Duration::from_secs(self.http.timeout_secs)),
            user_agent: self.http.user_agent.clone(),
        }
    }

    /// 認証プロバイダー
    pub fn auth_provider(&self) -> AuthProvider {
        let mut auth = AuthProvider::new();
        if let Some(token) = &self.auth.github_token {
            auth = auth.with_github_token(token);
        }
        if let Some(token) = &self.auth.gitlab_token {
            auth = auth.with_gitlab_token(token);
        }
        if let Some(token) = &self.auth.bitbucket_token {
            auth = auth.with_bitbucket_token(token);
        }
        auth
    }
}

/// データディレクトリ配下のファイル配置
#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    /// `$SRCPM_HOME` または `~/.srcpm`
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = EnvVar::get_path("SRCPM_HOME") {
            return Ok(Self::with_data_dir(dir));
        }
        let home = EnvVar::home_dir()
            .ok_or_else(|| SrcpmError::Config("HOME environment variable not set".into()))?;
        Ok(Self::with_data_dir(home.join(".srcpm")))
    }

    /// カスタムディレクトリで作成（テスト用）
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    /// レジストリファイル
    pub fn nodes_file(&self) -> PathBuf {
        self.data_dir.join("nodes.json")
    }

    /// ローカルバンドル定義
    pub fn bundles_file(&self) -> PathBuf {
        self.data_dir.join("bundles.json")
    }
}

/// インストールルートを解決
///
/// 優先順位: `$SRCPM_ROOT` > 設定ファイル > `$GOPATH` の先頭 > `~/go`
pub fn resolve_install_root(settings: &Settings) -> Result<PathBuf> {
    if let Some(root) = EnvVar::get_path("SRCPM_ROOT") {
        return Ok(root);
    }
    if let Some(root) = &settings.install_root {
        return Ok(root.clone());
    }
    if let Some(root) = EnvVar::first_path_in_list("GOPATH") {
        return Ok(root);
    }
    EnvVar::home_dir()
        .map(|home| home.join("go"))
        .ok_or_else(|| SrcpmError::Config("Cannot determine install root".into()))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
