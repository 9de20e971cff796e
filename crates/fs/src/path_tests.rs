use super::*;

fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[test]
fn normalize_folds_dot_components() {
    let cases: &[(&str, &str)] = &[
        ("/a/b/c", "/a/b/c"),
        ("/a/./b", "/a/b"),
        ("/a/b/../c", "/a/c"),
        ("/a/b/", "/a/b"),
        ("/../a", "/a"),
        ("/..", "/"),
        ("a/../..", ".."),
        ("../a/./b", "../a/b"),
        ("./", "."),
        ("", "."),
        ("a//b", "a/b"),
    ];

    for (input, expected) in cases {
        assert_eq!(
            normalize(Path::new(input)),
            p(expected),
            "normalize({input:?})"
        );
    }
}

#[test]
fn resolve_behaves_like_joining_then_normalizing() {
    let cases: &[(&str, &str, &str)] = &[
        ("/root", "out", "/root/out"),
        ("/root", "./out-fixtures/", "/root/out-fixtures"),
        ("/root", "/abs/out", "/abs/out"),
        ("/root/out", "", "/root/out"),
        ("/root/out", "a.txt", "/root/out/a.txt"),
        ("/root/out", "../a.txt", "/root/a.txt"),
        ("/root/out", "nested/deep/a.txt", "/root/out/nested/deep/a.txt"),
    ];

    for (base, segment, expected) in cases {
        assert_eq!(
            resolve(Path::new(base), Path::new(segment)),
            p(expected),
            "resolve({base:?}, {segment:?})"
        );
    }
}

#[test]
fn resolve_never_leaves_trailing_separator() {
    let out = resolve(Path::new("/root"), Path::new("out/"));
    assert!(!ends_with_separator(&out), "got {}", out.display());
}

#[test]
fn relative_walks_up_and_down() {
    let cases: &[(&str, &str, &str)] = &[
        ("/in", "/in/a.txt", "a.txt"),
        ("/in/", "/in/sub/a.txt", "sub/a.txt"),
        ("/in", "/in", ""),
        ("/in/sub", "/in/a.txt", "../a.txt"),
        ("/in", "/other/a.txt", "../other/a.txt"),
        ("/", "/a", "a"),
    ];

    for (from, to, expected) in cases {
        assert_eq!(
            relative(Path::new(from), Path::new(to)),
            p(expected),
            "relative({from:?}, {to:?})"
        );
    }
}

#[test]
fn relative_then_resolve_round_trips() {
    let pairs: &[(&str, &str)] = &[
        ("/root/out/", "/root/out/a.txt"),
        ("/root/out", "/root/out/x/y/z.js"),
        ("/root/out", "/root/out"),
        ("/root/out/sub", "/root/out/a.txt"),
    ];

    for (base, path) in pairs {
        let rel = relative(Path::new(base), Path::new(path));
        assert_eq!(
            resolve(Path::new(base), &rel),
            p(path),
            "round trip through {}",
            rel.display()
        );
    }
}

#[test]
fn with_trailing_separator_adds_exactly_one() {
    let cases: &[(&str, &str)] = &[
        ("/root/out", "/root/out/"),
        ("/root/out/", "/root/out/"),
        ("/root/out//", "/root/out/"),
        ("/root/./out/../out", "/root/out/"),
        ("/", "/"),
    ];

    for (input, expected) in cases {
        let got = with_trailing_separator(Path::new(input));
        assert_eq!(
            got.as_os_str(),
            std::ffi::OsStr::new(expected),
            "with_trailing_separator({input:?})"
        );
        assert!(ends_with_separator(&got));
    }
}

#[test]
fn ends_with_separator_reads_raw_text() {
    assert!(ends_with_separator(Path::new("/a/")));
    assert!(!ends_with_separator(Path::new("/a")));
    assert!(!ends_with_separator(Path::new("")));
    // Path equality alone cannot tell these apart.
    assert_eq!(Path::new("/a/"), Path::new("/a"));
}

#[test]
fn to_unix_string_joins_with_forward_slashes() {
    assert_eq!(to_unix_string(Path::new("a/b/c.js.map")), "a/b/c.js.map");
    assert_eq!(to_unix_string(Path::new("../maps/a.map")), "../maps/a.map");
    assert_eq!(to_unix_string(Path::new("/")), "/");
    assert_eq!(to_unix_string(Path::new("")), "");
}
