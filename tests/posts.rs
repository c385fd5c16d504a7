#[path = "common/mod.rs"]
mod common;

use common::*;
use sentimentopolis::{read_posts, read_posts_dir, read_posts_file, write_posts, PostFormat, TrajectoryAnalyzer};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn format_follows_extension() {
    assert_eq!(PostFormat::from_path(Path::new("a/posts.json")), Some(PostFormat::JsonArray));
    assert_eq!(PostFormat::from_path(Path::new("posts.JSONL")), Some(PostFormat::Jsonl));
    assert_eq!(PostFormat::from_path(Path::new("posts.ndjson")), Some(PostFormat::Jsonl));
    assert_eq!(PostFormat::from_path(Path::new("posts.jsonl.zst")), Some(PostFormat::JsonlZst));
    assert_eq!(PostFormat::from_path(Path::new("notes.txt")), None);
    assert_eq!(PostFormat::from_path(Path::new("README")), None);
}

#[test]
fn every_layout_reads_back_what_was_written() {
    let dir = tempdir().unwrap();
    let posts = corpus_multi_day();
    for name in ["posts.json", "posts.jsonl", "posts.jsonl.zst"] {
        let path = dir.path().join(name);
        write_posts(&path, &posts).unwrap();
        assert_eq!(read_posts(&path).unwrap(), posts, "{name}");
    }
}

#[test]
fn layout_is_sniffed_from_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("posts.json");
    let jsonl: String = corpus_multi_day().iter().map(|p| serde_json::to_string(p).unwrap() + "\n").collect();
    fs::write(&path, format!("\n\n{jsonl}")).unwrap();
    assert_eq!(read_posts_file(&path).unwrap(), corpus_multi_day());
}

#[test]
fn empty_files_hold_no_posts() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.jsonl");
    fs::write(&empty, "").unwrap();
    assert!(read_posts(&empty).unwrap().is_empty());

    let blank = dir.path().join("blank.json");
    fs::write(&blank, "  \n\t\n").unwrap();
    assert!(read_posts(&blank).unwrap().is_empty());

    let array = dir.path().join("array.json");
    fs::write(&array, "[]").unwrap();
    assert!(read_posts(&array).unwrap().is_empty());
}

#[test]
fn unknown_fields_are_ignored_and_float_timestamps_floored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("posts.jsonl");
    fs::write(
        &path,
        r#"{"id":"x","title":"T","created_utc":1704067200.75,"score":3,"gilded":0,"comments":[{"id":"c","body":"hi","created_utc":1704067201.9,"score":2,"distinguished":null}]}"#,
    )
    .unwrap();
    let posts = read_posts(&path).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].created_utc, JAN1_2024);
    assert_eq!(posts[0].selftext, "");
    assert_eq!(posts[0].author, None);
    assert_eq!(posts[0].comments[0].created_utc, JAN1_2024 + 1);
    assert_eq!(posts[0].comments[0].author, None);
}

#[test]
fn missing_required_field_names_the_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("posts.jsonl");
    let good = serde_json::to_string(&post("ok", JAN1_2024, vec![])).unwrap();
    let bad = r#"{"id":"bad","title":"no timestamp","score":1}"#;
    fs::write(&path, format!("{good}\n{bad}\n")).unwrap();

    let err = read_posts(&path).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("posts.jsonl:2"), "{msg}");
    assert!(msg.contains("created_utc"), "{msg}");
}

#[test]
fn post_without_comments_key_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("posts.json");
    fs::write(&path, r#"[{"id":"x","title":"T","created_utc":1704067200,"score":3}]"#).unwrap();

    let err = read_posts(&path).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("comments"), "{msg}");

    // An explicit empty list is fine.
    fs::write(&path, r#"[{"id":"x","title":"T","created_utc":1704067200,"score":3,"comments":[]}]"#).unwrap();
    assert!(read_posts(&path).unwrap()[0].comments.is_empty());
}

#[test]
fn directory_snapshots_replace_earlier_copies() {
    let dir = tempdir().unwrap();
    let day1 = vec![
        post("a", JAN1_2024, comments_on("a", JAN1_2024, "good", &[1, 1])),
        post("b", JAN1_2024, vec![]),
    ];
    // Re-fetched a day later: "a" now has more comments with higher scores.
    let day2 = vec![
        post("a", JAN1_2024, comments_on("a", JAN1_2024, "good", &[5; 6])),
        post("c", JAN1_2024 + DAY, vec![]),
    ];
    write_posts(&dir.path().join("2024-01-01.json"), &day1).unwrap();
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    write_posts(&dir.path().join("nested").join("2024-01-02.jsonl.zst"), &day2).unwrap();
    fs::write(dir.path().join("notes.txt"), "not posts").unwrap();

    let posts = read_posts(dir.path()).unwrap();
    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(posts[0].comments.len(), 6);

    let points = TrajectoryAnalyzer::lexical().progress(false).build_trajectory(&posts).unwrap();
    assert_eq!(points.len(), 1);
}

#[test]
fn empty_directory_reads_as_no_posts() {
    let dir = tempdir().unwrap();
    assert!(read_posts(dir.path()).unwrap().is_empty());
}

#[test]
fn walk_errors_stop_the_read() {
    let dir = tempdir().unwrap();
    let gone = dir.path().join("not_there");
    let err = read_posts_dir(&gone).unwrap_err();
    assert!(format!("{err:#}").contains("walk"), "{err:#}");
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(read_posts(&dir.path().join("nope.json")).is_err());
}
