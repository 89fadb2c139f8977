//! Several writers at once, on separate threads or sharing one writer.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use h5grid::{LockScope, Reader, Writer, WriterOptions};

const THREADS: usize = 8;

fn spawn_writers(dir: &std::path::Path, options: WriterOptions) -> Vec<PathBuf> {
    thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let options = options.clone();
                s.spawn(move || {
                    let w = Writer::create_with(dir, "test", options).unwrap();
                    w.write_scalar("scalar", t as f64).unwrap();
                    let m = w.create_matrix_4d("m", [2, 2, 3, 3]).unwrap();
                    for k in 0..3 {
                        w.write_point_4d(m, (t * 10 + k) as f64, [1, 0, k as i64, 2])
                            .unwrap();
                    }
                    let path = w.path().to_path_buf();
                    w.close().unwrap();
                    path
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

fn check_files(paths: &[PathBuf]) {
    let unique: HashSet<_> = paths.iter().collect();
    assert_eq!(unique.len(), paths.len(), "file names collided");

    let mut seen = HashSet::new();
    for path in paths {
        let r = Reader::open(path).unwrap();
        let t = r.read_scalar("scalar").unwrap();
        assert!(seen.insert(t as u64));
        for k in 0..3 {
            assert_eq!(
                r.read_point_4d("m", [1, 0, k, 2]).unwrap(),
                t * 10.0 + k as f64
            );
        }
        assert!(r.read_point_4d("m", [0, 0, 0, 0]).unwrap().is_nan());
    }
    assert_eq!(seen.len(), THREADS);
}

#[test]
fn independent_writers_under_global_lock() {
    let dir = tempfile::tempdir().unwrap();
    let paths = spawn_writers(dir.path(), WriterOptions::default());
    check_files(&paths);
}

#[test]
fn independent_writers_with_per_writer_locking() {
    let dir = tempfile::tempdir().unwrap();
    let paths = spawn_writers(
        dir.path(),
        WriterOptions::new().lock_scope(LockScope::PerWriter),
    );
    check_files(&paths);
}

#[test]
fn one_writer_shared_between_threads() {
    let dir = tempfile::tempdir().unwrap();
    let w = Arc::new(Writer::create(dir.path(), "shared").unwrap());
    let m = w.create_matrix_4d("grid", [THREADS as u64, 1, 4, 1]).unwrap();

    thread::scope(|s| {
        for t in 0..THREADS {
            let w = Arc::clone(&w);
            s.spawn(move || {
                w.write_scalar(&format!("s{t}"), t as f64).unwrap();
                for k in 0..4 {
                    w.write_point_4d(m, (t * 4 + k) as f64, [t as i64, 0, k as i64, 0])
                        .unwrap();
                }
            });
        }
    });

    let path = w.path().to_path_buf();
    Arc::try_unwrap(w).unwrap().close().unwrap();

    let r = Reader::open(path).unwrap();
    assert_eq!(r.dataset_names().len(), THREADS + 1);
    for t in 0..THREADS {
        assert_eq!(r.read_scalar(&format!("s{t}")).unwrap(), t as f64);
        for k in 0..4 {
            assert_eq!(
                r.read_point_4d("grid", [t as i64, 0, k as i64, 0]).unwrap(),
                (t * 4 + k) as f64
            );
        }
    }
    assert_eq!(r.min_over_matrix("grid").unwrap(), 0.0);
}

#[test]
fn readers_share_a_closed_file() {
    let dir = tempfile::tempdir().unwrap();
    let w = Writer::create(dir.path(), "ro").unwrap();
    let axis: Vec<f64> = (0..64).map(f64::from).collect();
    w.write_axis("x", &axis).unwrap();
    let path = w.path().to_path_buf();
    w.close().unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let r = Reader::open(&path).unwrap();
                assert_eq!(r.read_axis("x").unwrap(), axis);
                assert_eq!(r.read_point_1d("x", 63).unwrap(), 63.0);
            });
        }
    });
}
