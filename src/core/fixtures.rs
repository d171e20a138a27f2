//! Recording helper for HTTP fixtures.
//! Compiled only when the `test-mode` feature is enabled.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) fn fixture_dir() -> PathBuf {
    env::var("YF_FIXDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

/// Writes `body` to `<fixture_dir>/<endpoint>_<symbol>.<ext>`, the naming the
/// integration tests read back.
pub(crate) fn record_fixture(
    endpoint: &str,
    symbol: &str,
    ext: &str,
    body: &str,
) -> Result<(), std::io::Error> {
    let dir = fixture_dir();
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{endpoint}_{symbol}.{ext}"));
    fs::write(&path, body)?;
    tracing::debug!(path = %path.display(), "YF_RECORD: wrote fixture");
    Ok(())
}
