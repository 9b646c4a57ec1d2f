//! JSON state file holding a ledger snapshot between CLI invocations.
//!
//! Every mutation runs load, apply and save under an exclusive lock on the
//! sibling `<state>.lock` file, so concurrent `rrl` processes observe a single
//! total order of changes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use rrl_ledger::{InMemoryLedger, LedgerSnapshot};
use tempfile::NamedTempFile;

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a freshly initialized ledger. Refuses to overwrite.
    pub fn create(&self, ledger: &InMemoryLedger) -> anyhow::Result<()> {
        self.exclusive(|| {
            if self.path.exists() {
                bail!("ledger state already exists at {}", self.path.display());
            }
            self.save(ledger)
        })
    }

    /// Read the current state. Saves replace the file atomically, so no lock
    /// is needed.
    pub fn load(&self) -> anyhow::Result<InMemoryLedger> {
        let text = std::fs::read_to_string(&self.path).with_context(|| {
            format!(
                "reading ledger state {} (run `rrl init` first)",
                self.path.display()
            )
        })?;
        let snapshot: LedgerSnapshot = serde_json::from_str(&text)
            .with_context(|| format!("parsing ledger state {}", self.path.display()))?;
        Ok(InMemoryLedger::restore(snapshot)?)
    }

    /// Load the ledger, apply `op` and save the result, all under the state
    /// lock. A failing `op` leaves the file untouched.
    pub fn update<T>(
        &self,
        op: impl FnOnce(&InMemoryLedger) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        self.exclusive(|| {
            let ledger = self.load()?;
            let output = op(&ledger)?;
            self.save(&ledger)?;
            Ok(output)
        })
    }

    fn lock_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn exclusive<T>(&self, op: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("opening {}", lock_path.display()))?;
        let mut lock = fd_lock::RwLock::new(file);
        let _guard = lock
            .write()
            .with_context(|| format!("locking {}", lock_path.display()))?;
        op()
    }

    /// Persist via a unique sibling temp file and rename, so readers never see
    /// a partially written state.
    fn save(&self, ledger: &InMemoryLedger) -> anyhow::Result<()> {
        let encoded = serde_json::to_vec_pretty(&ledger.snapshot()?)?;
        let mut tmp = NamedTempFile::new_in(self.dir())
            .with_context(|| format!("creating temp file in {}", self.dir().display()))?;
        tmp.write_all(&encoded)
            .with_context(|| format!("writing {}", tmp.path().display()))?;
        tmp.persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "ledger state saved");
        Ok(())
    }
}
