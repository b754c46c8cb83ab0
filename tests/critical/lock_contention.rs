//! Advisory lock behaviour: contention, release on failure, concurrent writers.

use std::fs;
use std::thread;

use cookie_file_store::lock::lock_path_for;
use cookie_file_store::{Cookie, CookieStore, FileCookieStore, FileLock, StoreError, StoreOptions};

use crate::support::critical_utils::{
    VALID_LINE, cookie_file_with, cookie_file_with_lines, impatient_store,
};

#[test]
fn p0_held_lock_fails_mutation_without_applying_it() {
    let (_temp, path) = cookie_file_with_lines(&[VALID_LINE]);
    let before = fs::read_to_string(&path).expect("read");
    let _held = FileLock::acquire(&lock_path_for(&path), 0).expect("hold lock");

    let mut store = impatient_store(&path, 2);
    let err = store
        .put_cookie(Cookie::new("example.com", "/", "other", "1"))
        .unwrap_err();

    assert!(err.is_lock(), "expected lock error, got {err:?}");
    assert!(store.index().is_empty(), "mutation must not run");
    assert_eq!(fs::read_to_string(&path).expect("read"), before);
}

#[test]
fn p0_mutation_succeeds_after_lock_released() {
    let (_temp, path) = cookie_file_with_lines(&[VALID_LINE]);
    let held = FileLock::acquire(&lock_path_for(&path), 0).expect("hold lock");

    let mut store = impatient_store(&path, 0);
    assert!(
        store
            .remove_cookie("example.com", "/", "sid")
            .unwrap_err()
            .is_lock()
    );

    drop(held);
    store.remove_cookie("example.com", "/", "sid").expect("remove");
    assert!(store.get_all_cookies().expect("all").is_empty());
}

#[test]
fn p0_reads_do_not_wait_for_lock() {
    let (_temp, path) = cookie_file_with_lines(&[VALID_LINE]);
    let _held = FileLock::acquire(&lock_path_for(&path), 0).expect("hold lock");

    let mut store = impatient_store(&path, 0);
    let found = store.find_cookie("example.com", "/", "sid").expect("find");
    assert!(found.is_some());
}

#[test]
fn p0_lock_released_after_failed_reload() {
    let (_temp, path) = cookie_file_with(b"garbage without header\n");

    let mut store = impatient_store(&path, 0);
    let err = store
        .put_cookie(Cookie::new("example.com", "/", "sid", "abc"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Format { .. }), "got {err:?}");

    assert!(
        FileLock::acquire(&lock_path_for(&path), 0).is_ok(),
        "lock must be released after a failed reload"
    );
}

#[test]
fn p0_lock_skipped_without_auto_sync_until_save() {
    let (_temp, path) = cookie_file_with_lines(&[]);
    let held = FileLock::acquire(&lock_path_for(&path), 0).expect("hold lock");

    let mut store = FileCookieStore::open(
        &path,
        StoreOptions {
            auto_sync: false,
            lockfile_retries: 0,
            ..StoreOptions::default()
        },
    )
    .expect("open");

    store
        .put_cookie(Cookie::new("example.com", "/", "sid", "abc"))
        .expect("buffered put needs no lock");
    assert!(store.save().unwrap_err().is_lock());

    drop(held);
    store.save().expect("save");
    assert!(fs::read_to_string(&path).expect("read").contains("\tsid\tabc"));
}

#[test]
fn p0_concurrent_writers_lose_nothing() {
    let (_temp, path) = cookie_file_with_lines(&[]);

    let handles = (0..8)
        .map(|worker| {
            let path = path.clone();
            thread::spawn(move || {
                let mut store =
                    FileCookieStore::open(&path, StoreOptions::default()).expect("open");
                for n in 0..5 {
                    store
                        .put_cookie(Cookie::new(
                            "example.com",
                            "/",
                            format!("w{worker}-{n}"),
                            "v",
                        ))
                        .expect("put");
                }
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let mut reader = FileCookieStore::open(&path, StoreOptions::default()).expect("open");
    assert_eq!(reader.get_all_cookies().expect("all").len(), 40);
}

#[test]
fn p0_lock_released_after_failed_persist() {
    let (_temp, path) = cookie_file_with_lines(&[VALID_LINE]);

    let mut store = impatient_store(&path, 0);
    let swapped = path.clone();
    let err = store
        .update(move |index| {
            index.insert(Cookie::new("example.com", "/", "other", "1"));
            fs::remove_file(&swapped).expect("remove cookie file");
            fs::create_dir(&swapped).expect("replace with directory");
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::Io(_)), "got {err:?}");

    assert!(
        FileLock::acquire(&lock_path_for(&path), 0).is_ok(),
        "lock must be released after a failed persist"
    );
}
