use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_http_config_default() {
    let config = HttpConfig::default();
    assert_eq!(config.user_agent, "srcpm-cli");
    assert_eq!(config.stall_timeout, Some(Duration::from_secs(30)));
}

#[test]
fn test_auth_provider_builder() {
    let auth = AuthProvider::new()
        .with_github_token("gh_token")
        .with_gitlab_token("gl_token");

    assert_eq!(auth.explicit_token(HostKind::GitHub), Some("gh_token"));
    assert_eq!(auth.explicit_token(HostKind::GitLab), Some("gl_token"));
    assert_eq!(auth.explicit_token(HostKind::Bitbucket), None);
}

#[test]
fn test_auth_provider_explicit_wins() {
    let auth = AuthProvider::new().with_bitbucket_token("bb");
    assert_eq!(auth.token_for(HostKind::Bitbucket), Some("bb".to_string()));
}

#[test]
#[serial]
fn test_auth_provider_env_fallback() {
    std::env::set_var("GITLAB_TOKEN", "from-env");
    let auth = AuthProvider::new();
    assert_eq!(auth.token_for(HostKind::GitLab), Some("from-env".to_string()));
    std::env::remove_var("GITLAB_TOKEN");
}

#[test]
fn test_settings_missing_file_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::load(&temp_dir.path().join("config.toml")).unwrap();

    assert!(settings.install_root.is_none());
    assert_eq!(settings.default_branches, vec!["master", "main"]);
    assert!(settings.doc_patterns.iter().any(|p| p == "*.md"));
}

#[test]
fn test_settings_partial_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
install_root = "/opt/gopath"
default_branches = ["trunk"]

[http]
timeout_secs = 5

[auth]
github_token = "abc"
"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.install_root, Some(PathBuf::from("/opt/gopath")));
    assert_eq!(settings.default_branches, vec!["trunk"]);
    assert_eq!(settings.http.timeout_secs, 5);
    assert_eq!(settings.http.user_agent, "srcpm-cli");
    assert_eq!(
        settings.auth_provider().explicit_token(HostKind::GitHub),
        Some("abc")
    );
    assert_eq!(
        settings.http_config().stall_timeout,
        Some(Duration::from_secs(5))
    );
}

#[test]
fn test_settings_invalid_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "install_root = [").unwrap();

    let result = Settings::load(&path);
    assert!(matches!(result, Err(SrcpmError::Config(_))));
}

#[test]
fn test_app_paths_layout() {
    let paths = AppPaths::with_data_dir(PathBuf::from("/data"));
    assert_eq!(paths.nodes_file(), PathBuf::from("/data/nodes.json"));
    assert_eq!(paths.bundles_file(), PathBuf::from("/data/bundles.json"));
    assert_eq!(paths.config_file(), PathBuf::from("/data/config.toml"));
}

#[test]
#[serial]
fn test_resolve_install_root_prefers_env() {
    std::env::set_var("SRCPM_ROOT", "/env/root");
    let settings = Settings {
        install_root: Some(PathBuf::from("/settings/root")),
        ..Settings::default()
    };
    assert_eq!(
        resolve_install_root(&settings).unwrap(),
        PathBuf::from("/env/root")
    );
    std::env::remove_var("SRCPM_ROOT");
}

#[test]
#[serial]
fn test_resolve_install_root_settings_before_gopath() {
    std::env::remove_var("SRCPM_ROOT");
    let settings = Settings {
        install_root: Some(PathBuf::from("/settings/root")),
        ..Settings::default()
    };
    assert_eq!(
        resolve_install_root(&settings).unwrap(),
        PathBuf::from("/settings/root")
    );
}
