use std::path::{Path, PathBuf};

use super::*;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn app_name_accepts_grammar_matches() {
    for name in ["tool", "ab", "a1", "9lives", "my-app", "app_v2.1+build", "A.b-c_d+e"] {
        assert!(is_valid_app_name(name), "{name} should be valid");
    }
}

#[test]
fn app_name_rejects_short_or_punctuated_names() {
    for name in [
        "", "a", "Z", "7", "-tool", ".hidden", "_private", "+plus", "has space", "slash/name",
        "semi;colon", "tab\tname", "emoji\u{1F600}",
    ] {
        assert!(!is_valid_app_name(name), "{name:?} should be invalid");
    }
}

#[test]
fn validate_app_name_reports_offending_name() {
    let err = validate_app_name("x").expect_err("single character must fail");
    assert_eq!(err, AppError::InvalidName("x".to_string()));
    assert!(err.to_string().contains("invalid app name 'x'"));
}

#[test]
fn parse_git_url_keeps_host_and_path() {
    let source = parse_source_url_in("git://example.com/org/tool", Path::new("/work"))
        .expect("git url must parse");
    assert_eq!(source.scheme(), SourceScheme::Git);
    assert_eq!(source.host(), "example.com");
    assert_eq!(source.path(), "/org/tool");
    assert_eq!(source.app_name(), Some("tool"));
    assert_eq!(source.to_string(), "git://example.com/org/tool");
}

#[test]
fn parse_http_url_keeps_explicit_port_in_host() {
    let source = parse_source_url_in("http://registry.test:8080/apps/tool", Path::new("/"))
        .expect("http url must parse");
    assert_eq!(source.scheme(), SourceScheme::Http);
    assert_eq!(source.host(), "registry.test:8080");
}

#[test]
fn parse_rejects_unsupported_scheme() {
    let err = parse_source_url_in("ftp://example.com/tool", Path::new("/"))
        .expect_err("ftp must be rejected");
    assert_eq!(
        err.downcast_ref::<AppError>(),
        Some(&AppError::UnsupportedScheme {
            scheme: "ftp".to_string(),
            url: "ftp://example.com/tool".to_string(),
        })
    );
}

#[cfg(unix)]
#[test]
fn parse_lifts_relative_path_to_file_url() {
    let source =
        parse_source_url_in("apps/tool", Path::new("/home/dev")).expect("path must be lifted");
    assert_eq!(source.scheme(), SourceScheme::File);
    assert_eq!(source.host(), "");
    assert_eq!(source.path(), "/home/dev/apps/tool");
}

#[cfg(unix)]
#[test]
fn parse_lifts_absolute_path_without_cwd() {
    let source =
        parse_source_url_in("/srv/apps/tool", Path::new("/ignored")).expect("path must be lifted");
    assert_eq!(source.path(), "/srv/apps/tool");
}

#[test]
fn package_rel_path_rejects_bare_host() {
    for raw in ["git://host/", "git://host", "https://host/"] {
        let source = parse_source_url_in(raw, Path::new("/")).expect("url must parse");
        let err = source
            .package_rel_path()
            .expect_err("bare host must fail");
        assert!(
            matches!(err.downcast_ref::<AppError>(), Some(AppError::MissingPath(_))),
            "unexpected error for {raw}: {err}"
        );
    }
}

#[test]
fn package_rel_path_rejects_invalid_final_segment() {
    for raw in ["git://host/org/x", "git://host/org/-tool", "https://host/a/.b"] {
        let source = parse_source_url_in(raw, Path::new("/")).expect("url must parse");
        let err = source
            .package_rel_path()
            .expect_err("invalid name must fail");
        assert!(
            matches!(err.downcast_ref::<AppError>(), Some(AppError::InvalidName(_))),
            "unexpected error for {raw}: {err}"
        );
    }
}

#[test]
fn make_app_path_maps_scheme_host_and_path() {
    let app_path =
        make_app_path(Path::new("/base"), "git://example.com/org/tool").expect("must map");
    assert_eq!(
        app_path,
        PathBuf::from("/base/pkg/git/example.com/org/tool")
    );
}

#[test]
fn make_app_path_is_deterministic_for_equivalent_urls() {
    let base = Path::new("/base");
    let first = make_app_path(base, "git://example.com/org/tool").expect("must map");
    let again = make_app_path(base, "git://example.com/org/tool").expect("must map");
    let trailing = make_app_path(base, "git://example.com/org/tool/").expect("must map");
    let dotted = make_app_path(base, "git://example.com/org/sub/../tool").expect("must map");
    assert_eq!(first, again);
    assert_eq!(first, trailing);
    assert_eq!(first, dotted);
}

#[cfg(unix)]
#[test]
fn make_app_path_preserves_file_path_under_pkg_file() {
    let app_path = make_app_path(Path::new("/base"), "file:///home/dev/tool").expect("must map");
    assert_eq!(app_path, PathBuf::from("/base/pkg/file/home/dev/tool"));
}

#[test]
fn make_app_path_rejects_text_that_is_not_an_app_name() {
    let err = make_app_path(Path::new("/base"), "not a url").expect_err("must fail");
    assert!(
        matches!(err.downcast_ref::<AppError>(), Some(AppError::InvalidName(_))),
        "unexpected error: {err}"
    );
}

#[test]
fn split_args_without_separator_keeps_everything_as_run_args() {
    let args = strings(&["git://h/a/tool", "make", "-j4"]);
    let split = split_args(&args);
    assert_eq!(split.source, Some("git://h/a/tool"));
    assert_eq!(split.run_args, &args[1..]);
    assert!(split.launch_args.is_empty());
}

#[test]
fn split_args_partitions_at_first_separator_only() {
    let args = strings(&["url", "build", "--", "--verbose", "--", "x"]);
    let split = split_args(&args);
    assert_eq!(split.run_args, strings(&["build"]).as_slice());
    assert_eq!(split.launch_args, strings(&["--verbose", "--", "x"]).as_slice());

    let mut rejoined = split.run_args.to_vec();
    rejoined.push("--".to_string());
    rejoined.extend_from_slice(split.launch_args);
    assert_eq!(rejoined, args[1..]);
}

#[test]
fn split_args_handles_separator_edges() {
    let leading = strings(&["url", "--", "a"]);
    let split = split_args(&leading);
    assert!(split.run_args.is_empty());
    assert_eq!(split.launch_args, strings(&["a"]).as_slice());

    let trailing = strings(&["url", "a", "--"]);
    let split = split_args(&trailing);
    assert_eq!(split.run_args, strings(&["a"]).as_slice());
    assert!(split.launch_args.is_empty());

    let empty: Vec<String> = Vec::new();
    let split = split_args(&empty);
    assert_eq!(split.source, None);
    assert!(split.run_args.is_empty());
}

#[test]
fn host_build_args_use_engine_vocabulary() {
    let [os, arch] = host_build_args();
    assert_eq!(os, format!("HOSTOS={}", host_os()));
    assert_eq!(arch, format!("HOSTARCH={}", host_arch()));
    assert_ne!(host_arch(), "x86_64");
    assert_ne!(host_os(), "macos");
}

#[test]
fn symlink_conflict_messages_are_distinct() {
    let link = PathBuf::from("/base/bin/tool");
    let not_link = AppError::SymlinkConflict {
        link: link.clone(),
        kind: SymlinkConflictKind::NotSymlink,
    };
    let elsewhere = AppError::SymlinkConflict {
        link,
        kind: SymlinkConflictKind::PointsElsewhere,
    };
    assert_ne!(not_link.to_string(), elsewhere.to_string());
    assert!(not_link.to_string().contains("/base/bin/tool"));
}
