use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use caws_context::ProjectContext;
use serde_json::Value;

use crate::entry::ProvenanceEntry;
use crate::error::ProvenanceError;
use crate::error::Result;

/// Persistent home of one provenance chain.
///
/// Stores deal in entries exactly as written, so verification sees what is on
/// disk rather than what the entry type would re-serialize. No locking is
/// done: two processes appending at once can fork the chain, which
/// verification then reports as a break.
pub trait ChainStore {
    /// A chain that was never written loads as empty. Only the container has
    /// to be readable; individual entries may have any shape.
    fn load_raw(&self) -> Result<Vec<Value>>;
    fn save_raw(&self, chain: &[Value]) -> Result<()>;

    /// Persist `entry` after `chain`, which is what `load_raw` just returned.
    fn append(&self, chain: &[Value], entry: &Value) -> Result<()> {
        let mut next = chain.to_vec();
        next.push(entry.clone());
        self.save_raw(&next)
    }

    /// Typed view of the chain. Fails on the first entry that does not parse.
    fn load(&self) -> Result<Vec<ProvenanceEntry>> {
        self.load_raw()?
            .into_iter()
            .enumerate()
            .map(|(position, value)| {
                serde_json::from_value(value)
                    .map_err(|source| ProvenanceError::InvalidEntry { position, source })
            })
            .collect()
    }

    fn save(&self, chain: &[ProvenanceEntry]) -> Result<()> {
        let raw = chain
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        self.save_raw(&raw)
    }
}

impl<T: ChainStore + ?Sized> ChainStore for Box<T> {
    fn load_raw(&self) -> Result<Vec<Value>> {
        (**self).load_raw()
    }

    fn save_raw(&self, chain: &[Value]) -> Result<()> {
        (**self).save_raw(chain)
    }

    fn append(&self, chain: &[Value], entry: &Value) -> Result<()> {
        (**self).append(chain, entry)
    }
}

/// The chain as a single JSON array, replaced wholesale on every write.
pub struct JsonFileChainStore {
    path: PathBuf,
}

impl JsonFileChainStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn for_project(ctx: &ProjectContext) -> Self {
        Self::new(ctx.resolve(&ctx.layout().chain))
    }
}

impl ChainStore for JsonFileChainStore {
    fn load_raw(&self) -> Result<Vec<Value>> {
        let Some(data) = read_if_exists(&self.path)? else {
            return Ok(Vec::new());
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|e| corrupt(&self.path, e.to_string()))
    }

    fn save_raw(&self, chain: &[Value]) -> Result<()> {
        let json = serde_json::to_string_pretty(chain)?;
        replace_file(&self.path, json.as_bytes())
    }
}

/// One entry per line. Appends write only the new line.
pub struct JsonLinesChainStore {
    path: PathBuf,
}

impl JsonLinesChainStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn for_project(ctx: &ProjectContext) -> Self {
        Self::new(ctx.resolve(&ctx.layout().chain))
    }
}

impl ChainStore for JsonLinesChainStore {
    fn load_raw(&self) -> Result<Vec<Value>> {
        let Some(data) = read_if_exists(&self.path)? else {
            return Ok(Vec::new());
        };
        data.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line)
                    .map_err(|e| corrupt(&self.path, format!("line {}: {e}", n + 1)))
            })
            .collect()
    }

    fn save_raw(&self, chain: &[Value]) -> Result<()> {
        let mut buf = String::new();
        for entry in chain {
            buf.push_str(&serde_json::to_string(entry)?);
            buf.push('\n');
        }
        replace_file(&self.path, buf.as_bytes())
    }

    fn append(&self, _chain: &[Value], entry: &Value) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_err(&self.path, e))?;
        // A last line cut short of its newline must not swallow this entry.
        if !ends_with_newline(&mut file).map_err(|e| io_err(&self.path, e))? {
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes())
            .map_err(|e| io_err(&self.path, e))
    }
}

/// True for an empty file or one whose last byte is `\n`.
fn ends_with_newline(file: &mut std::fs::File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// In-process chain, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryChainStore {
    entries: Mutex<Vec<Value>>,
}

impl MemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for MemoryChainStore {
    fn load_raw(&self) -> Result<Vec<Value>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_raw(&self, chain: &[Value]) -> Result<()> {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = chain.to_vec();
        Ok(())
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Write to a sibling temp file, then rename over `path`.
fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| io_err(dir, e))?;
    tmp.write_all(contents).map_err(|e| io_err(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| io_err(path, e.error))?;
    Ok(())
}

fn io_err(path: &Path, source: std::io::Error) -> ProvenanceError {
    ProvenanceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn corrupt(path: &Path, message: String) -> ProvenanceError {
    ProvenanceError::Corrupt {
        path: path.to_path_buf(),
        message,
    }
}
