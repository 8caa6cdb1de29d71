use bytes::Bytes;
use once_cell::unsync::OnceCell;
use std::io::{self, BufReader, Cursor, Read, Write};
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::locator::DocumentLocator;
use crate::stream::{ByteSource, StreamCache, StreamOpener};

/// Buffers the whole document in memory.
///
/// A cache instance holds one document; create a new one per run.
#[derive(Debug, Default)]
pub struct MemoryStreamCache {
    buffer: OnceCell<Bytes>,
}

impl MemoryStreamCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_populated(&self) -> bool {
        self.buffer.get().is_some()
    }
}

impl StreamCache for MemoryStreamCache {
    fn cache(
        &self,
        source: &dyn ByteSource,
        locator: &DocumentLocator,
    ) -> io::Result<Box<dyn StreamOpener>> {
        let bytes = self.buffer.get_or_try_init(|| {
            let mut stream = source.open(locator)?;
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf)?;
            debug!(document = %locator, bytes = buf.len(), "Cached document in memory");
            Ok::<_, io::Error>(Bytes::from(buf))
        })?;

        Ok(Box::new(MemoryOpener {
            bytes: bytes.clone(),
        }))
    }
}

struct MemoryOpener {
    bytes: Bytes,
}

impl StreamOpener for MemoryOpener {
    fn open_stream(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }

    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Spills the document to a temporary file that lives as long as the cache
/// or any opener handed out by it.
#[derive(Debug, Default)]
pub struct FileStreamCache {
    dir: Option<PathBuf>,
    spilled: OnceCell<(Rc<NamedTempFile>, u64)>,
}

impl FileStreamCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the temporary file under `dir` instead of the system temp dir.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            spilled: OnceCell::new(),
        }
    }

    fn spill(
        &self,
        source: &dyn ByteSource,
        locator: &DocumentLocator,
    ) -> io::Result<(Rc<NamedTempFile>, u64)> {
        let mut file = match &self.dir {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        let mut stream = source.open(locator)?;
        let len = io::copy(&mut stream, &mut file)?;
        file.flush()?;
        debug!(
            document = %locator,
            bytes = len,
            path = %file.path().display(),
            "Spilled document to temporary file"
        );
        Ok((Rc::new(file), len))
    }
}

impl StreamCache for FileStreamCache {
    fn cache(
        &self,
        source: &dyn ByteSource,
        locator: &DocumentLocator,
    ) -> io::Result<Box<dyn StreamOpener>> {
        let (file, len) = self.spilled.get_or_try_init(|| self.spill(source, locator))?;
        Ok(Box::new(FileOpener {
            file: Rc::clone(file),
            len: *len,
        }))
    }
}

struct FileOpener {
    file: Rc<NamedTempFile>,
    len: u64,
}

impl StreamOpener for FileOpener {
    fn open_stream(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(BufReader::new(self.file.reopen()?)))
    }

    fn len(&self) -> u64 {
        self.len
    }
}
