use super::*;

use std::{
    fs::{self, create_dir, write},
    time::{Duration, UNIX_EPOCH},
};

#[test]
fn write_flag_follows_overwrite() {
    let cases: &[(bool, WriteFlag, &str)] = &[
        (true, WriteFlag::Truncate, "w"),
        (false, WriteFlag::Exclusive, "wx"),
    ];

    for (overwrite, flag, text) in cases {
        let got = WriteFlag::from_overwrite(*overwrite);
        assert_eq!(got, *flag, "overwrite={overwrite}");
        assert_eq!(got.as_str(), *text);
        assert_eq!(got.to_string(), *text);
    }
}

#[test]
fn write_flag_serializes_as_canonical_string() {
    assert_eq!(
        serde_json::to_string(&WriteFlag::Truncate).expect("serialize"),
        "\"w\""
    );
    assert_eq!(
        serde_json::from_str::<WriteFlag>("\"wx\"").expect("deserialize"),
        WriteFlag::Exclusive
    );
}

#[test]
fn default_stat_is_empty() {
    let stat = Stat::default();
    assert_eq!(stat.mode, None, "empty stat must not claim mode 0");
    assert_eq!(stat.mtime, None);
    assert_eq!(stat.size, 0);
    assert!(!stat.is_dir);
    assert!(!stat.is_symlink);
}

#[test]
fn to_datetime_handles_none_and_epoch_offsets() {
    assert_eq!(to_datetime(None), None);

    let t = UNIX_EPOCH + Duration::from_millis(1_500);
    let dt = to_datetime(Some(t)).expect("some datetime");
    assert_eq!(dt.timestamp_millis(), 1_500);
}

#[test]
fn from_metadata_reads_regular_file() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let file_path = tmp.path().join("file.txt");
    write(&file_path, b"hello world").expect("write file");

    let meta = fs::symlink_metadata(&file_path).expect("stat file");
    let stat = Stat::from_metadata(&meta);

    assert_eq!(stat.size, 11);
    assert!(!stat.is_dir);
    assert!(!stat.is_symlink);
    assert!(stat.mtime.is_some(), "regular files carry an mtime");

    #[cfg(unix)]
    assert!(stat.mode.is_some(), "unix files carry permission bits");
}

#[test]
fn from_metadata_marks_directories_with_zero_size() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let sub = tmp.path().join("sub");
    create_dir(&sub).expect("create subdir");

    let stat = Stat::from_metadata(&fs::symlink_metadata(&sub).expect("stat dir"));
    assert!(stat.is_dir);
    assert_eq!(stat.size, 0);
}

#[cfg(unix)]
#[test]
fn from_metadata_sees_symlinks_through_symlink_metadata() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let target = tmp.path().join("target.txt");
    let link = tmp.path().join("link.txt");
    write(&target, b"x").expect("write target");
    std::os::unix::fs::symlink(&target, &link).expect("create symlink");

    let stat = Stat::from_metadata(&fs::symlink_metadata(&link).expect("lstat link"));
    assert!(stat.is_symlink);
}
