use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};

/// Reads `length` bytes starting at `start` with a single `read` call.
///
/// A short read is reported as [`io::ErrorKind::UnexpectedEof`] rather than
/// retried or padded.
pub fn read_content<R: Read + Seek>(reader: &mut R, start: u64, length: u64) -> io::Result<Bytes> {
    if length == 0 {
        return Ok(Bytes::new());
    }

    let length = usize::try_from(length)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "range does not fit in memory"))?;

    if start > 0 {
        reader.seek(SeekFrom::Start(start))?;
    }

    let mut buffer = BytesMut::zeroed(length);
    let read = reader.read(&mut buffer)?;
    if read < length {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("read {read} of {length} bytes at offset {start}"),
        ));
    }
    Ok(buffer.freeze())
}

/// Opens `path` and reads the given window. The file is closed before
/// returning, whether or not the read succeeded.
pub fn read_file(path: impl AsRef<Path>, start: u64, length: u64) -> io::Result<Bytes> {
    if length == 0 {
        return Ok(Bytes::new());
    }
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let content = read_content(&mut file, start, length)?;
    tracing::debug!(path = %path.display(), start, length, "read file content");
    Ok(content)
}

/// A file on disk together with the byte size it had when opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource {
    path: PathBuf,
    byte_size: u64,
}

impl FileResource {
    /// Reads the file size from its metadata.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<FileResource> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        Self::from_metadata(path, &metadata)
    }

    /// Same as [`FileResource::open`] using [`tokio::fs::metadata`].
    pub async fn open_async(path: impl Into<PathBuf>) -> io::Result<FileResource> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path).await?;
        Self::from_metadata(path, &metadata)
    }

    fn from_metadata(path: PathBuf, metadata: &std::fs::Metadata) -> io::Result<FileResource> {
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(FileResource { path, byte_size: metadata.len() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The size of the file when it was opened.
    ///
    /// Later changes to the file are not observed.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn read_range(&self, start: u64, length: u64) -> io::Result<Bytes> {
        read_file(&self.path, start, length)
    }
}
