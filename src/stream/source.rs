use bytes::Bytes;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};

use crate::locator::DocumentLocator;
use crate::stream::ByteSource;

/// Serves the same in-memory bytes for any locator.
#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Bytes,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl ByteSource for MemorySource {
    fn open(&self, _locator: &DocumentLocator) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }
}

/// Reads `file://` locators from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FileSource {
    pub fn new() -> Self {
        Self
    }
}

impl ByteSource for FileSource {
    fn open(&self, locator: &DocumentLocator) -> io::Result<Box<dyn Read>> {
        let url = locator.as_url();
        if url.scheme() != "file" {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file locator: {locator}"),
            ));
        }
        let path = url.to_file_path().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("locator has no local path: {locator}"),
            )
        })?;
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}
