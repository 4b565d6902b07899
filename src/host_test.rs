use super::*;

/// テスト用スタブホスト（ネットワークを使わない）
struct StubHost {
    kind: HostKind,
    prefix: &'static str,
    pattern: Regex,
}

impl StubHost {
    fn new(kind: HostKind, prefix: &'static str, pattern: &str) -> Self {
        Self {
            kind,
            prefix,
            pattern: Regex::new(pattern).unwrap(),
        }
    }
}

impl PackageHost for StubHost {
    fn kind(&self) -> HostKind {
        self.kind
    }

    fn prefix(&self) -> &str {
        self.prefix
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn list_refs<'a>(&'a self, _groups: &'a MatchGroups) -> HostFuture<'a, Vec<GitRef>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn download_archive<'a>(
        &'a self,
        _groups: &'a MatchGroups,
        _sha: &'a str,
    ) -> HostFuture<'a, Vec<u8>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

fn default_registry() -> HostRegistry {
    let auth = AuthProvider::new()
        .with_github_token("gh")
        .with_gitlab_token("gl")
        .with_bitbucket_token("bb");
    HostRegistry::with_defaults(&HttpConfig::default(), &auth).unwrap()
}

#[test]
fn test_host_kind_as_str() {
    assert_eq!(HostKind::GitHub.as_str(), "github");
    assert_eq!(HostKind::GitLab.as_str(), "gitlab");
    assert_eq!(HostKind::Bitbucket.as_str(), "bitbucket");
}

#[test]
fn test_host_kind_display() {
    assert_eq!(format!("{}", HostKind::GitHub), "github");
}

#[test]
fn test_default_registration_order() {
    let registry = default_registry();
    let kind = |path: &str| registry.classify(path).map(|(h, _)| h.kind()).ok();
    assert_eq!(kind("github.com/a/b"), Some(HostKind::GitHub));
    assert_eq!(kind("gitlab.com/a/b"), Some(HostKind::GitLab));
    assert_eq!(kind("bitbucket.org/a/b"), Some(HostKind::Bitbucket));
}

#[test]
fn test_classify_extracts_groups() {
    let registry = default_registry();
    let (host, groups) = registry.classify("github.com/owner/repo/sub/pkg").unwrap();

    assert_eq!(host.kind(), HostKind::GitHub);
    assert_eq!(groups.owner(), "owner");
    assert_eq!(groups.repo(), "repo");
    assert_eq!(groups.dir(), "/sub/pkg");
}

#[test]
fn test_classify_missing_subpath_is_empty_group() {
    let registry = default_registry();
    let (_, groups) = registry.classify("bitbucket.org/owner/repo").unwrap();

    assert_eq!(groups.dir(), "");
    assert_eq!(groups.get("owner"), Some("owner"));
    assert_eq!(groups.get("missing"), None);
}

#[test]
fn test_classify_malformed_path_under_known_host_is_not_found() {
    let registry = default_registry();
    let err = registry.classify("github.com/only-owner").err().unwrap();
    assert!(matches!(err, SrcpmError::NotFound(_)));
}

#[test]
fn test_classify_unknown_host_is_invalid_path() {
    let registry = default_registry();
    let err = registry.classify("example.net/owner/repo").err().unwrap();
    assert!(matches!(err, SrcpmError::InvalidImportPath(_)));
}

#[test]
fn test_classify_does_not_fall_through_to_lower_priority_host() {
    // 2番目のホストは何でも受け付けるが、最初のプレフィックス一致で確定する
    let registry = HostRegistry::new(vec![
        Box::new(StubHost::new(
            HostKind::GitHub,
            "github.com/",
            &host_pattern_source(r"github\.com"),
        )),
        Box::new(StubHost::new(HostKind::GitLab, "github.com/", r"^(?P<owner>.*)$")),
    ]);

    let err = registry.classify("github.com/bad path").err().unwrap();
    assert!(matches!(err, SrcpmError::NotFound(_)));
}

#[test]
fn test_classify_picks_first_prefix_not_first_pattern() {
    // 1番目のホストのパターンは先頭ホストと無関係でも、プレフィックスが優先される
    let registry = HostRegistry::new(vec![
        Box::new(StubHost::new(HostKind::GitLab, "gitlab.com/", r"^.*$")),
        Box::new(StubHost::new(
            HostKind::GitHub,
            "github.com/",
            &host_pattern_source(r"github\.com"),
        )),
    ]);

    let (host, _) = registry.classify("github.com/owner/repo").unwrap();
    assert_eq!(host.kind(), HostKind::GitHub);
}

#[test]
fn test_empty_registry() {
    let registry = HostRegistry::new(Vec::new());
    assert!(matches!(
        registry.classify("github.com/a/b"),
        Err(SrcpmError::InvalidImportPath(_))
    ));
}
