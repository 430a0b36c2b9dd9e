//! Content-root scan and fingerprint comparison integration tests.

use assert_fs::prelude::*;
use rstest::rstest;
use siteship_core::{local, ContentHash, CoreError, Fingerprint, RelativeKey};

// ---------------------------------------------------------------------------
// 1. Fingerprint normalization
// ---------------------------------------------------------------------------

#[rstest]
#[case("\"abc123\" ", "abc123")]
#[case("abc123", "abc123")]
#[case("  \"abc123\"", "abc123")]
#[case("\"\"abc123\"\"", "abc123")]
#[case("\t\"abc123\"\n", "abc123")]
fn normalized_fingerprint_equals_raw_hash(#[case] raw: &str, #[case] hash: &str) {
    let fp = Fingerprint::normalize(raw);
    assert!(fp.matches(&ContentHash(hash.to_string())), "{raw:?} vs {hash}");
}

// ---------------------------------------------------------------------------
// 2. Scan
// ---------------------------------------------------------------------------

#[test]
fn scan_reads_content_and_hash_on_demand() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("index.html").write_str("<h1>home</h1>").expect("write");
    root.child("blog/2024/post.html")
        .write_str("<p>post</p>")
        .expect("write");

    let files = local::scan(root.path()).expect("scan");
    assert_eq!(files.len(), 2);

    let post = files
        .get(&RelativeKey::from("blog/2024/post.html"))
        .expect("post listed");
    let (bytes, hash) = post.read_hashed().expect("read");
    assert_eq!(bytes, b"<p>post</p>");
    assert_eq!(hash, ContentHash::of(b"<p>post</p>"));
}

#[test]
fn scan_sees_edits_made_after_listing() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("a.html").write_str("v1").expect("write");
    let files = local::scan(root.path()).expect("scan");

    root.child("a.html").write_str("v2").expect("rewrite");
    let file = files.get(&RelativeKey::from("a.html")).expect("a.html");
    assert_eq!(file.read().expect("read"), b"v2");
}

#[test]
fn scan_of_missing_root_names_the_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let missing = home.child("compiled");
    let err = local::scan(missing.path()).unwrap_err();
    assert!(matches!(err, CoreError::MissingRoot { .. }), "got: {err}");
    assert!(err.to_string().contains("compiled"));
}

#[test]
fn read_of_vanished_file_is_io_error() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("gone.css").write_str("x").expect("write");
    let files = local::scan(root.path()).expect("scan");
    std::fs::remove_file(root.child("gone.css").path()).expect("remove");

    let err = files[&RelativeKey::from("gone.css")].read().unwrap_err();
    assert!(matches!(err, CoreError::Io { .. }), "got: {err}");
}
