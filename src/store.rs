//! Result persistence: `{"analysis_type": ..., "dates": [["YYYY-MM-DD", value], ...]}`.

use crate::result::AnalysisResult;
use crate::util::{create_with_backoff, open_with_backoff, replace_file_atomic_backoff, tmp_sibling};
use anyhow::{Context, Result};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write `result` as pretty JSON. The file only appears once fully written.
pub fn save(result: &AnalysisResult, path: &Path) -> Result<()> {
    result.validate()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = tmp_sibling(path);
    if let Err(e) = write_json(&tmp, result) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.context(format!("serialize {}", path.display())));
    }
    if let Err(e) = replace_file_atomic_backoff(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    tracing::info!("Wrote {} {} points to {}", result.dates.len(), result.analysis_type, path.display());
    Ok(())
}

fn write_json(tmp: &Path, result: &AnalysisResult) -> Result<()> {
    let f = create_with_backoff(tmp).with_context(|| format!("create {}", tmp.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, result)?;
    w.write_all(b"\n")?;
    w.flush().with_context(|| format!("flush {}", tmp.display()))?;
    Ok(())
}

/// Read a result back and check it (ascending dates, finite values).
pub fn load(path: &Path) -> Result<AnalysisResult> {
    let f = open_with_backoff(path).with_context(|| format!("open {}", path.display()))?;
    let result: AnalysisResult =
        serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parse results {}", path.display()))?;
    result.validate().with_context(|| format!("validate {}", path.display()))?;
    Ok(result)
}
