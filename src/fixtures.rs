//! Fixture staging
//!
//! Copies input files into a working directory for the duration of a
//! [`FixtureScope`] and removes exactly those copies when the scope ends,
//! including when the scenario bails out early or panics.
//!
//! Destinations held by an open scope are tracked process-wide, so two
//! scopes can never stage the same file name into the same directory at the
//! same time.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::common::{Error, Result};

fn held() -> MutexGuard<'static, HashSet<PathBuf>> {
    static HELD: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    HELD.get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Copy `sources` into `dir` under their base names
///
/// Fails without leaving anything behind: files copied before the failing
/// one are removed again.
pub fn stage<P: AsRef<Path>>(sources: &[P], dir: &Path) -> Result<FixtureScope> {
    let dir = dir.canonicalize().map_err(|e| {
        Error::Config(format!(
            "Working directory '{}' is not usable: {}",
            dir.display(),
            e
        ))
    })?;

    let mut scope = FixtureScope {
        dir,
        claimed: Vec::with_capacity(sources.len()),
        created: Vec::with_capacity(sources.len()),
    };
    for source in sources {
        scope.stage_one(source.as_ref())?;
    }

    tracing::debug!(
        dir = %scope.dir.display(),
        count = scope.created.len(),
        "staged fixtures"
    );
    Ok(scope)
}

/// Files staged for one scenario; removed on drop
#[derive(Debug)]
pub struct FixtureScope {
    dir: PathBuf,
    claimed: Vec<PathBuf>,
    created: Vec<PathBuf>,
}

impl FixtureScope {
    /// Directory the fixtures were staged into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination paths created by this scope
    pub fn staged(&self) -> &[PathBuf] {
        &self.created
    }

    /// End the scope now instead of at end of block
    pub fn release(self) {}

    fn stage_one(&mut self, source: &Path) -> Result<()> {
        let name = source
            .file_name()
            .ok_or_else(|| Error::copy(source, &self.dir, "source has no file name"))?;
        let destination = self.dir.join(name);

        if !source.is_file() {
            return Err(Error::not_found(source));
        }

        if !held().insert(destination.clone()) {
            return Err(Error::FixtureInUse { destination });
        }
        self.claimed.push(destination.clone());

        if destination.exists() {
            return Err(Error::copy(
                source,
                &destination,
                "destination already exists and was not staged by the harness",
            ));
        }

        if let Err(e) = std::fs::copy(source, &destination) {
            // The destination did not exist before the copy, so any partial file is ours
            if let Err(remove) = std::fs::remove_file(&destination) {
                if remove.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %destination.display(),
                        error = %remove,
                        "failed to remove partially staged fixture"
                    );
                }
            }
            return Err(Error::copy(source, &destination, e.to_string()));
        }
        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            "staged fixture"
        );
        self.created.push(destination);
        Ok(())
    }
}

impl Drop for FixtureScope {
    fn drop(&mut self) {
        for path in self.created.drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove staged fixture");
            }
        }

        let mut held = held();
        for path in self.claimed.drain(..) {
            held.remove(&path);
        }
    }
}
