use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install a `tracing` subscriber honouring `RUST_LOG` (default `info`).
/// Safe to call repeatedly; only the first call has an effect.
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .try_init();
    });
}

// -------- robust file ops (AV scanners / sync clients hold files briefly) --------

const TRIES: usize = 16;
const DELAY_MS: u64 = 50;

/// Transient OS errors worth retrying: sharing/lock violations, AV blocks,
/// devices briefly not ready. Raw codes are the Windows ones; elsewhere only
/// `Interrupted`/`WouldBlock` qualify.
fn is_retriable_io_error(e: &io::Error) -> bool {
    if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) {
        return true;
    }
    if cfg!(windows) {
        return matches!(e.raw_os_error(), Some(5 | 21 | 32 | 33 | 225 | 1006 | 1117 | 1224));
    }
    false
}

/// Run `op` up to `tries` times, sleeping a linearly growing delay between
/// retriable failures. Non-retriable errors return immediately.
fn with_backoff<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..tries.max(1) {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "retries exhausted")))
}

pub fn open_with_backoff(path: &Path) -> io::Result<File> {
    with_backoff(TRIES, DELAY_MS, || File::open(path))
}

pub fn create_with_backoff(path: &Path) -> io::Result<File> {
    with_backoff(TRIES, DELAY_MS, || File::create(path))
}

/// Sibling temp path used for write-then-promote: `out.json` -> `out.json.tmp`.
pub fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "out".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Promote `tmp` over `dest`. Falls back to copy+remove when rename is refused.
pub fn replace_file_atomic_backoff(tmp: &Path, dest: &Path) -> Result<()> {
    let renamed = with_backoff(20, DELAY_MS, || fs::rename(tmp, dest));
    if renamed.is_ok() {
        return Ok(());
    }
    with_backoff(20, DELAY_MS, || fs::copy(tmp, dest))
        .with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
    match with_backoff(20, DELAY_MS, || fs::remove_file(tmp)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", tmp.display())),
    }
}
