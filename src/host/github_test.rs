use super::*;

fn host() -> GitHubHost {
    GitHubHost::new(Client::new(), &AuthProvider::new().with_github_token("t0ken")).unwrap()
}

#[test]
fn test_into_git_refs_from_api_json() {
    let json = r#"[
        {"ref": "refs/heads/master", "url": "u", "object": {"sha": "abc", "type": "commit", "url": "u"}},
        {"ref": "refs/tags/v1.0", "url": "u", "object": {"sha": "111", "type": "commit", "url": "u"}}
    ]"#;
    let entries: Vec<RefEntry> = serde_json::from_str(json).unwrap();
    let refs = into_git_refs(entries);

    assert_eq!(
        refs,
        vec![
            GitRef::branch("master", "abc"),
            GitRef::tag("v1.0", "111"),
        ]
    );
}

#[test]
fn test_pattern_captures() {
    let host = host();
    let caps = host.pattern().captures("github.com/owner/repo/sub/pkg").unwrap();
    assert_eq!(&caps["owner"], "owner");
    assert_eq!(&caps["repo"], "repo");
    assert_eq!(&caps["dir"], "/sub/pkg");
}

#[test]
fn test_pattern_rejects_missing_repo() {
    assert!(!host().pattern().is_match("github.com/owner"));
}

#[test]
fn test_project_path() {
    let groups = MatchGroups::new("owner", "repo", "/sub");
    assert_eq!(host().project_path(&groups), "github.com/owner/repo");
}

#[test]
fn test_headers_carry_bearer_token() {
    let headers = host().headers();
    assert!(headers
        .iter()
        .any(|(name, value)| *name == "Authorization" && value == "Bearer t0ken"));
}

#[test]
fn test_archive_url() {
    let groups = MatchGroups::new("owner", "repo", "");
    assert_eq!(
        http::expand(ARCHIVE_URL, &groups, &[("sha", "deadbeef")]),
        "https://github.com/owner/repo/archive/deadbeef.zip"
    );
}
