use super::*;
use proptest::prelude::*;

/// owner/repo に使える文字列
fn valid_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,19}".prop_map(|s| s)
}

/// サブパス（空、または `/` 区切りのセグメント）
fn subpath_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9_]{1,8}", 0..3).prop_map(|segs| {
        segs.iter().map(|s| format!("/{}", s)).collect::<String>()
    })
}

fn registry() -> HostRegistry {
    let auth = AuthProvider::new()
        .with_github_token("gh")
        .with_gitlab_token("gl")
        .with_bitbucket_token("bb");
    HostRegistry::with_defaults(&HttpConfig::default(), &auth).unwrap()
}

proptest! {
    /// どのホストでも owner/repo/dir がそのまま取り出される
    #[test]
    fn prop_classify_returns_named_groups(
        host_idx in 0usize..3,
        owner in valid_name_strategy(),
        repo in valid_name_strategy(),
        dir in subpath_strategy(),
    ) {
        let (prefix, kind) = [
            ("github.com/", HostKind::GitHub),
            ("gitlab.com/", HostKind::GitLab),
            ("bitbucket.org/", HostKind::Bitbucket),
        ][host_idx];
        let path = format!("{}{}/{}{}", prefix, owner, repo, dir);

        let registry = registry();
        let (host, groups) = registry.classify(&path).unwrap();

        prop_assert_eq!(host.kind(), kind);
        prop_assert_eq!(groups.owner(), owner.as_str());
        prop_assert_eq!(groups.repo(), repo.as_str());
        prop_assert_eq!(groups.dir(), dir.as_str());
        prop_assert_eq!(host.project_path(&groups), format!("{}{}/{}", prefix, owner, repo));
    }

    /// 既知ホスト配下でパターンに合わないパスは常に NotFound
    #[test]
    fn prop_malformed_known_host_is_not_found(owner in valid_name_strategy()) {
        let path = format!("github.com/{}", owner);
        let registry = registry();
        prop_assert!(matches!(registry.classify(&path), Err(SrcpmError::NotFound(_))));
    }
}
