//! Reading and writing post collections.
//!
//! A collection is stored as a JSON array, as JSONL/NDJSON (one post per line),
//! or as zstd-compressed JSONL. On read the layout is detected from the first
//! non-whitespace byte, so `posts.json` holding JSONL works too. A directory is
//! read as a sequence of snapshots (see [`read_posts_dir`]).

use crate::model::Post;
use crate::util::{create_with_backoff, open_with_backoff, replace_file_atomic_backoff, tmp_sibling};
use ahash::AHashMap;
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zstd::stream::read::Decoder;
use zstd::stream::write::Encoder as ZstdEncoder;

const READ_BUF: usize = 256 * 1024;
const WRITE_BUF: usize = 256 * 1024;

/// On-disk layout of a post collection, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostFormat {
    JsonArray,
    Jsonl,
    JsonlZst,
}

impl PostFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(PostFormat::JsonArray),
            "jsonl" | "ndjson" => Some(PostFormat::Jsonl),
            "zst" => Some(PostFormat::JsonlZst),
            _ => None,
        }
    }
}

/// Read posts from a file or a directory of snapshot files.
pub fn read_posts(path: &Path) -> Result<Vec<Post>> {
    if path.is_dir() {
        read_posts_dir(path)
    } else {
        read_posts_file(path)
    }
}

/// Read a single file. `.zst` is decompressed first; everything else is read as-is.
pub fn read_posts_file(path: &Path) -> Result<Vec<Post>> {
    let file = open_with_backoff(path).with_context(|| format!("open {}", path.display()))?;
    if PostFormat::from_path(path) == Some(PostFormat::JsonlZst) {
        let mut decoder = Decoder::new(file).with_context(|| format!("zstd init {}", path.display()))?;
        decoder.window_log_max(31)?;
        read_posts_from(BufReader::with_capacity(READ_BUF, decoder), path)
    } else {
        read_posts_from(BufReader::with_capacity(READ_BUF, file), path)
    }
}

/// Read every supported file under `dir` (recursively, sorted by path).
/// Later snapshots of a post (same `id`) replace earlier ones in place, so the
/// result keeps first-seen order without duplicates.
pub fn read_posts_dir(dir: &Path) -> Result<Vec<Post>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if entry.file_type().is_file() && PostFormat::from_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        tracing::warn!("No post files (.json/.jsonl/.ndjson/.zst) under {}", dir.display());
    }

    let mut posts: Vec<Post> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();
    let mut replaced = 0usize;
    for file in &files {
        for post in read_posts_file(file)? {
            match index.get(&post.id) {
                Some(&i) => {
                    posts[i] = post;
                    replaced += 1;
                }
                None => {
                    index.insert(post.id.clone(), posts.len());
                    posts.push(post);
                }
            }
        }
    }
    tracing::info!(
        "Read {} posts from {} files under {} ({} re-snapshotted)",
        posts.len(),
        files.len(),
        dir.display(),
        replaced
    );
    Ok(posts)
}

fn read_posts_from<R: BufRead>(mut reader: R, path: &Path) -> Result<Vec<Post>> {
    // Skip leading whitespace to find out whether this is an array or JSONL.
    let mut leading_newlines = 0usize;
    let first = loop {
        let (consumed, first, newlines) = {
            let buf = reader.fill_buf().with_context(|| format!("read {}", path.display()))?;
            if buf.is_empty() {
                return Ok(Vec::new());
            }
            let (consumed, first) = match buf.iter().position(|b| !b.is_ascii_whitespace()) {
                Some(i) => (i, Some(buf[i])),
                None => (buf.len(), None),
            };
            (consumed, first, buf[..consumed].iter().filter(|b| **b == b'\n').count())
        };
        leading_newlines += newlines;
        reader.consume(consumed);
        if let Some(b) = first {
            break b;
        }
    };

    if first == b'[' {
        return serde_json::from_reader(reader).with_context(|| format!("parse post array {}", path.display()));
    }

    let mut posts = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let post: Post = serde_json::from_str(line)
            .with_context(|| format!("parse post at {}:{}", path.display(), leading_newlines + i + 1))?;
        posts.push(post);
    }
    Ok(posts)
}

/// Write `posts` in the layout implied by `path`'s extension (JSON array when
/// unknown). Written to a sibling temp file first, then promoted.
pub fn write_posts(path: &Path, posts: &[Post]) -> Result<()> {
    let tmp = tmp_sibling(path);
    let f = create_with_backoff(&tmp).with_context(|| format!("create {}", tmp.display()))?;
    let mut w = BufWriter::with_capacity(WRITE_BUF, f);
    match PostFormat::from_path(path).unwrap_or(PostFormat::JsonArray) {
        PostFormat::JsonArray => {
            serde_json::to_writer_pretty(&mut w, posts)?;
            w.write_all(b"\n")?;
        }
        PostFormat::Jsonl => write_lines(&mut w, posts)?,
        PostFormat::JsonlZst => {
            let mut enc = ZstdEncoder::new(&mut w, 3)?;
            write_lines(&mut enc, posts)?;
            enc.finish()?;
        }
    }
    w.flush().with_context(|| format!("flush {}", tmp.display()))?;
    drop(w);
    replace_file_atomic_backoff(&tmp, path)
}

fn write_lines<W: Write>(w: &mut W, posts: &[Post]) -> Result<()> {
    for post in posts {
        serde_json::to_writer(&mut *w, post)?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
