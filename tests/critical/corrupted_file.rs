//! Corrupted and hand-edited cookie files.

use std::fs;

use cookie_file_store::{Cookie, CookieStore, FileCookieStore, StoreError, StoreOptions};

use crate::support::critical_utils::{VALID_LINE, cookie_file_with, cookie_file_with_lines};

fn forced_options() -> StoreOptions {
    StoreOptions {
        force_parse: true,
        ..StoreOptions::default()
    }
}

#[test]
fn p0_truncated_line_fails_with_line_number() {
    let (_temp, path) = cookie_file_with_lines(&[VALID_LINE, "example.com\tFALSE\t/\tFALSE"]);

    let mut store = FileCookieStore::open(&path, StoreOptions::default()).expect("open");
    match store.find_cookies("example.com", None) {
        Err(StoreError::Parse {
            line_number,
            reason,
            ..
        }) => {
            assert_eq!(line_number, 6);
            assert!(reason.contains("found 4"), "reason: {reason}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn p0_parse_error_never_contains_cookie_value() {
    let (_temp, path) =
        cookie_file_with_lines(&["example.com\tFALSE\t/\tFALSE\t0\tsid\ttop-secret\textra"]);

    let mut store = FileCookieStore::open(&path, StoreOptions::default()).expect("open");
    let err = store.get_all_cookies().unwrap_err();

    assert!(matches!(err, StoreError::Parse { .. }));
    assert!(!err.to_string().contains("top-secret"), "leaked: {err}");
}

#[test]
fn p0_force_parse_skips_bad_lines_and_rewrites_clean_file() {
    let (_temp, path) = cookie_file_with_lines(&["not\ta\tcookie", VALID_LINE]);

    let mut store = FileCookieStore::open(&path, forced_options()).expect("open");
    let all = store.get_all_cookies().expect("all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].key, "sid");

    store
        .put_cookie(Cookie::new("example.com", "/", "next", "1"))
        .expect("put");
    let text = fs::read_to_string(&path).expect("read");
    assert!(!text.contains("not\ta\tcookie"));
    assert!(text.contains("\tsid\tabc"));
    assert!(text.contains("\tnext\t1"));
}

#[test]
fn p0_failed_reload_keeps_previous_index() {
    let (_temp, path) = cookie_file_with_lines(&[VALID_LINE]);

    let mut store = FileCookieStore::open(&path, StoreOptions::default()).expect("open");
    assert_eq!(store.get_all_cookies().expect("all").len(), 1);

    fs::write(&path, "# Netscape HTTP Cookie File\nbroken line\n").expect("corrupt");
    assert!(store.find_cookie("example.com", "/", "sid").is_err());

    assert!(
        store.index().find_one("example.com", "/", "sid").is_some(),
        "index must not be partially replaced"
    );
}

#[test]
fn p0_non_utf8_file_surfaces_io_error() {
    let (_temp, path) = cookie_file_with(b"# Netscape HTTP Cookie File\n\xff\xfe\xfd\n");

    let mut store = FileCookieStore::open(&path, forced_options()).expect("open");
    let err = store.get_all_cookies().unwrap_err();
    assert!(matches!(err, StoreError::Io(_)), "got {err:?}");
}

#[test]
fn p0_crlf_file_decodes() {
    let content = format!("# Netscape HTTP Cookie File\r\n\r\n{VALID_LINE}\r\n");
    let (_temp, path) = cookie_file_with(content.as_bytes());

    let mut store = FileCookieStore::open(&path, StoreOptions::default()).expect("open");
    let found = store
        .find_cookie("example.com", "/", "sid")
        .expect("find")
        .expect("cookie present");
    assert_eq!(found.value(), "abc");
}

#[test]
fn p0_file_deleted_between_operations_is_recreated() {
    let (_temp, path) = cookie_file_with_lines(&[VALID_LINE]);

    let mut store = FileCookieStore::open(&path, StoreOptions::default()).expect("open");
    fs::remove_file(&path).expect("delete");

    assert!(store.find_cookie("example.com", "/", "other").expect("find").is_none());
    assert!(fs::read_to_string(&path).expect("read").starts_with("# Netscape"));
}
