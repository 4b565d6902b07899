use std::path::{Path, PathBuf};
use thiserror::Error;

/// SRCPM統一エラー型
#[derive(Debug, Error)]
pub enum SrcpmError {
    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid import path: {0}. No registered host matches")]
    InvalidImportPath(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{host} API error: {message} (status: {status})")]
    HostApi {
        host: String,
        status: u16,
        message: String,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown node type: {0:?}")]
    UnknownNodeType(String),

    #[error("Snapshot lookup is not implemented: {0}")]
    SnapshotUnsupported(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("VCS error: {0}")]
    Vcs(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SrcpmError>;

/// エラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidPath,
    Network,
    Archive,
    Filesystem,
    UnknownNodeType,
    Other,
}

impl SrcpmError {
    /// エラーを分類する
    pub fn kind(&self) -> ErrorKind {
        match self {
            SrcpmError::NotFound(_) => ErrorKind::NotFound,
            SrcpmError::InvalidImportPath(_) => ErrorKind::InvalidPath,
            SrcpmError::Network(_) | SrcpmError::HostApi { .. } => ErrorKind::Network,
            SrcpmError::Archive(_) => ErrorKind::Archive,
            SrcpmError::Filesystem { .. } => ErrorKind::Filesystem,
            SrcpmError::UnknownNodeType(_) => ErrorKind::UnknownNodeType,
            _ => ErrorKind::Other,
        }
    }

    /// パス付きのファイルシステムエラーを生成するクロージャ
    ///
    /// `.map_err(SrcpmError::fs(&path))` の形で使う。
    pub fn fs(path: &Path) -> impl FnOnce(std::io::Error) -> SrcpmError + '_ {
        move |source| SrcpmError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
