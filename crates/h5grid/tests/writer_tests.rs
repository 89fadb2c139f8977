//! Writer construction, dataset creation and error paths.

use std::collections::HashMap;

use h5grid::{Error, LockScope, Reader, Writer, WriterOptions};

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn file_name_follows_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create(dir.path(), "sim").unwrap();
    let name = w.path().file_name().unwrap().to_str().unwrap().to_string();
    let digits = name
        .strip_prefix("sim___")
        .and_then(|r| r.strip_suffix(".h5"))
        .unwrap();
    assert!((1..=7).contains(&digits.len()));
    let n: u32 = digits.parse().unwrap();
    assert!((1..=1_000_000).contains(&n));
}

#[test]
fn repeated_construction_gives_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = Writer::create(dir.path(), "p").unwrap();
    let b = Writer::create(dir.path(), "p").unwrap();
    assert_ne!(a.path(), b.path());
}

#[test]
fn seeded_options_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let opts = WriterOptions::new().seed(1234).extension("hdf5");
    let a = Writer::create_with(dir.path(), "s", opts.clone()).unwrap();
    let first = a.path().to_path_buf();
    a.close().unwrap();
    let b = Writer::create_with(dir.path(), "s", opts).unwrap();
    assert_eq!(b.path(), first.as_path());
    assert_eq!(first.extension().unwrap(), "hdf5");
}

#[test]
fn missing_directory_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let err = Writer::create(&missing, "x").unwrap_err();
    assert!(matches!(err, Error::DirectoryNotFound { ref path } if path == &missing));
    assert!(!missing.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn read_only_directory_follows_actual_write_access() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let locked = dir.path().join("locked");
    std::fs::create_dir(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged callers can still write into a 0o555 directory.
    let canary = locked.join("canary");
    let writable = std::fs::write(&canary, b"x").is_ok();
    let _ = std::fs::remove_file(&canary);

    let result = Writer::create(&locked, "x");
    let entries = std::fs::read_dir(&locked).unwrap().count();
    let created = result.is_ok();
    let denied = matches!(result, Err(Error::PermissionDenied { ref path }) if path == &locked);
    drop(result);
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

    if writable {
        assert!(created);
        assert_eq!(entries, 1);
    } else {
        assert!(denied);
        assert_eq!(entries, 0);
    }
}

#[test]
fn engine_create_failure_is_file_creation_failed() {
    let dir = tempfile::tempdir().unwrap();
    let err = Writer::create(dir.path(), "missing_sub/x").unwrap_err();
    match err {
        Error::FileCreationFailed { path, .. } => {
            assert!(path.starts_with(dir.path().join("missing_sub")));
            assert!(!path.exists());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

#[test]
fn duplicate_scalar_fails_with_dataset_creation() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create(dir.path(), "d").unwrap();
    w.write_scalar("x", 1.0).unwrap();
    let err = w.write_scalar("x", 2.0).unwrap_err();
    assert!(matches!(err, Error::DatasetCreationFailed { ref name, .. } if name == "x"));

    let path = w.path().to_path_buf();
    w.close().unwrap();
    assert_eq!(Reader::open(path).unwrap().read_scalar("x").unwrap(), 1.0);
}

#[test]
fn labeled_scalars_use_name_underscore_key() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create(dir.path(), "l").unwrap();
    let values = HashMap::from([
        ("min".to_string(), -4.0),
        ("max".to_string(), 9.5),
        ("mean".to_string(), 1.25),
    ]);
    w.write_labeled_scalars("stats", &values).unwrap();
    let path = w.path().to_path_buf();
    w.close().unwrap();

    let r = Reader::open(path).unwrap();
    let mut names = r.dataset_names();
    names.sort();
    assert_eq!(names, vec!["stats_max", "stats_mean", "stats_min"]);
    assert_eq!(r.read_scalar("stats_min").unwrap(), -4.0);
    assert_eq!(r.read_scalar("stats_max").unwrap(), 9.5);
    assert_eq!(r.read_scalar("stats_mean").unwrap(), 1.25);
}

#[test]
fn labeled_scalars_keep_entries_before_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create(dir.path(), "l").unwrap();
    let values = HashMap::from([
        ("a".to_string(), 1.0),
        ("bad/key".to_string(), 2.0),
        ("c".to_string(), 3.0),
        ("d".to_string(), 4.0),
    ]);
    let err = w.write_labeled_scalars("s", &values).unwrap_err();
    assert!(matches!(err, Error::DatasetCreationFailed { ref name, .. } if name == "s_bad/key"));
    let path = w.path().to_path_buf();
    w.close().unwrap();

    // Exactly the entries visited before the invalid key were committed.
    let mut expected: Vec<String> = values
        .keys()
        .take_while(|k| k.as_str() != "bad/key")
        .map(|k| format!("s_{k}"))
        .collect();
    expected.sort();

    let r = Reader::open(path).unwrap();
    let mut names = r.dataset_names();
    names.sort();
    assert_eq!(names, expected);
    for name in &names {
        let key = name.trim_start_matches("s_");
        assert_eq!(r.read_scalar(name).unwrap(), values[key]);
    }
}

#[test]
fn empty_axis_is_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create(dir.path(), "e").unwrap();
    w.write_axis("none", &[]).unwrap();
    let path = w.path().to_path_buf();
    w.close().unwrap();

    let r = Reader::open(path).unwrap();
    assert!(r.read_axis("none").unwrap().is_empty());
    assert_eq!(r.shape("none").unwrap(), vec![0]);
}

#[test]
fn huge_matrix_is_allocation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create(dir.path(), "big").unwrap();
    let err = w
        .create_matrix_4d("m", [u64::MAX, u64::MAX, 2, 2])
        .unwrap_err();
    assert!(matches!(err, Error::AllocationFailed { ref name, .. } if name == "m"));
}

// ---------------------------------------------------------------------------
// Matrices and handles
// ---------------------------------------------------------------------------

#[test]
fn point_write_out_of_range_is_rejected_locally() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create(dir.path(), "m").unwrap();
    let h = w.create_matrix_4d("m", [2, 2, 2, 2]).unwrap();
    for bad in [[2, 0, 0, 0], [0, 0, 0, -1], [0, 5, 0, 0]] {
        let err = w.write_point_4d(h, 1.0, bad).unwrap_err();
        match err {
            Error::IndexOutOfRange {
                coordinate,
                extents,
                ..
            } => {
                assert_eq!(coordinate, bad.to_vec());
                assert_eq!(extents, vec![2, 2, 2, 2]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn handle_from_other_writer_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let a = Writer::create(dir.path(), "a").unwrap();
    let b = Writer::create(dir.path(), "b").unwrap();
    let ha = a.create_matrix_4d("m", [1, 1, 1, 1]).unwrap();
    b.create_matrix_4d("m", [1, 1, 1, 1]).unwrap();
    assert!(matches!(
        b.write_point_4d(ha, 1.0, [0, 0, 0, 0]),
        Err(Error::InvalidHandle)
    ));
}

#[test]
fn handle_rank_must_match_call() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create(dir.path(), "r").unwrap();
    let h4 = w.create_matrix_4d("four", [1, 1, 1, 1]).unwrap();
    let h5 = w.create_matrix_5d("five", [1, 1, 1, 1, 1]).unwrap();
    assert!(matches!(
        w.write_point_5d(h4, 1.0, [0, 0, 0, 0, 0]),
        Err(Error::RankMismatch {
            expected: 4,
            actual: 5,
            ..
        })
    ));
    assert!(matches!(
        w.write_point_4d(h5, 1.0, [0, 0, 0, 0]),
        Err(Error::RankMismatch {
            expected: 5,
            actual: 4,
            ..
        })
    ));
}

#[test]
fn five_d_matrix_points() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create_with(
        dir.path(),
        "five",
        WriterOptions::new().lock_scope(LockScope::PerWriter),
    )
    .unwrap();
    let h = w.create_matrix_5d("cube", [2, 2, 2, 2, 3]).unwrap();
    w.write_point_5d(h, 42.0, [1, 0, 1, 0, 2]).unwrap();
    let path = w.path().to_path_buf();
    w.close().unwrap();

    let r = Reader::open(path).unwrap();
    assert_eq!(r.shape("cube").unwrap(), vec![2, 2, 2, 2, 3]);
    assert_eq!(r.read_point_5d("cube", [1, 0, 1, 0, 2]).unwrap(), 42.0);
    assert!(r.read_point_5d("cube", [1, 0, 1, 0, 1]).unwrap().is_nan());
}

#[test]
fn drop_without_close_leaves_readable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = {
        let w = Writer::create(dir.path(), "drop").unwrap();
        let h = w.create_matrix_4d("m", [1, 1, 1, 2]).unwrap();
        w.write_point_4d(h, 3.0, [0, 0, 0, 1]).unwrap();
        w.path().to_path_buf()
    };
    let r = Reader::open(path).unwrap();
    assert_eq!(r.read_point_4d("m", [0, 0, 0, 1]).unwrap(), 3.0);
}
