use super::*;

use std::path::PathBuf;

use chrono::{Duration, TimeZone};
use prepare_fs::Stat;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

fn modified_at(secs: i64) -> FileRecord {
    FileRecord::new("/in", "/in/a.txt").with_stat(Stat {
        mtime: Some(at(secs)),
        ..Stat::default()
    })
}

#[test]
fn canonical_record_passes_through_untouched() {
    // Wrapping would normalize this path.
    let record = FileRecord::new("/in/./", "/in/./sub/../a.txt").with_contents("body");

    let out = Src::default()
        .normalize(SourceItem::Record(record.clone()))
        .expect("normalize")
        .expect("forwarded");

    assert_eq!(out, record);
    assert_eq!(out.path.as_os_str(), record.path.as_os_str());
}

#[cfg(unix)]
#[test]
fn descriptors_are_wrapped() {
    let desc = FileDescriptor {
        path: PathBuf::from("/in/./sub/../a.txt"),
        base: Some(PathBuf::from("/in")),
        cwd: Some(PathBuf::from("/work")),
        ..Default::default()
    };

    let out = Src::default()
        .normalize(desc.into())
        .expect("normalize")
        .expect("forwarded");

    assert_eq!(out.path, PathBuf::from("/in/a.txt"));
    assert_eq!(out.cwd, PathBuf::from("/work"));
    assert_eq!(out.relative(), PathBuf::from("a.txt"));
}

#[cfg(unix)]
#[test]
fn symlink_override_replaces_path_first() {
    let record = FileRecord::new("/in", "/real/target.txt").with_symlink_target("/in/link.txt");

    let out = Src::default()
        .normalize(record.into())
        .expect("normalize")
        .expect("forwarded");
    assert_eq!(out.path, PathBuf::from("/in/link.txt"));
    assert_eq!(out.symlink_target, None);
}

#[cfg(unix)]
#[test]
fn relative_symlink_override_on_record_stays_under_cwd() {
    let record = FileRecord::new("/in", "/in/a.txt").with_symlink_target("link.txt");

    let out = Src::default()
        .normalize(record.into())
        .expect("normalize")
        .expect("forwarded");
    assert_eq!(out.path, PathBuf::from("/in/link.txt"));

    let dest = crate::Dest::new("out", crate::PrepareOptions::new().cwd("/root"))
        .expect("valid output folder");
    let (records, errors) = crate::stream::run_all(&dest, [out]);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(records[0].path, PathBuf::from("/root/out/link.txt"));
}

#[test]
fn since_uses_inclusive_boundary() {
    let src = Src::new(SrcOptions::new().since(at(1_000)));

    let cases: &[(i64, bool)] = &[(999, false), (1_000, false), (1_001, true)];
    for (mtime, kept) in cases {
        let out = src.normalize(modified_at(*mtime).into()).expect("normalize");
        assert_eq!(out.is_some(), *kept, "mtime {mtime} vs since 1000");
    }
}

#[test]
fn since_accepts_every_timestamp_shape() {
    let threshold = at(1_700_000_000);
    let shapes: Vec<Since> = vec![
        Since::At(threshold),
        Since::Millis(1_700_000_000_000),
        Since::Text("2023-11-14T22:13:20Z".to_owned()),
        Since::Text(" 1700000000000 ".to_owned()),
        Since::from(std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000)),
    ];

    for since in shapes {
        assert_eq!(since.to_datetime(), Some(threshold), "shape {since:?}");
    }
}

#[test]
fn since_can_be_computed_per_file() {
    let src = Src::new(SrcOptions::new().since_with(|f: &FileRecord| {
        if f.extension().as_deref() == Some("txt") {
            Since::Millis(5_000_000)
        } else {
            Since::Millis(0)
        }
    }));

    assert!(src.normalize(modified_at(4_000).into()).expect("normalize").is_none());

    let js = FileRecord::new("/in", "/in/a.js").with_stat(Stat {
        mtime: Some(at(4_000)),
        ..Stat::default()
    });
    assert!(src.normalize(js.into()).expect("normalize").is_some());
}

#[test]
fn invalid_since_is_a_stream_fatal_error() {
    let src = Src::new(SrcOptions::new().since("last tuesday"));
    let err = src
        .normalize(modified_at(10).into())
        .expect_err("invalid since");

    assert!(matches!(err, PrepareError::InvalidSince));
    assert!(err.aborts_stream());
    assert_eq!(
        err.to_string(),
        "expected since option to be a date or timestamp"
    );
}

#[test]
fn invalid_since_is_reported_once_and_stops_the_stage() {
    let src = Src::new(SrcOptions::new().since(Since::Millis(i64::MAX)));
    let items: Vec<SourceItem> = (0..5).map(|i| modified_at(i).into()).collect();

    let (records, errors) = crate::stream::run_all(&src, items);
    assert!(records.is_empty());
    assert_eq!(errors.len(), 1);
}

#[test]
fn files_without_mtime_are_kept() {
    let src = Src::new(SrcOptions::new().since(Utc::now() + Duration::days(1)));
    let out = src
        .normalize(FileRecord::new("/in", "/in/a.txt").into())
        .expect("normalize");
    assert!(out.is_some());
}

#[test]
fn transform_emits_zero_or_one_record() {
    let src = Src::new(SrcOptions::new().since(at(100)));

    assert!(src.transform(modified_at(50).into()).expect("stale").is_empty());
    assert_eq!(src.transform(modified_at(150).into()).expect("fresh").len(), 1);
}
