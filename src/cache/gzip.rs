//! Decompressing reader over a committed cache file

use crate::error::{IndexError, IndexResult};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Lazily decompresses a gzip file as it is read.
///
/// The file handle is opened once, so a commit that replaces the cache file
/// while this reader is alive does not affect what it returns.
pub struct GzipReader {
    path: PathBuf,
    decoder: MultiGzDecoder<File>,
}

impl GzipReader {
    /// Open `path` and verify it starts with a gzip header.
    pub fn open(path: &Path) -> IndexResult<Self> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(IndexError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(IndexError::io(format!("opening {}", path.display()), e)),
        };

        let mut magic = [0u8; 2];
        match file.read_exact(&mut magic) {
            Ok(()) if magic == GZIP_MAGIC => {}
            Ok(()) => return Err(corrupt(path, "not in gzip format")),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(corrupt(path, "file too short for a gzip header"))
            }
            Err(e) => return Err(IndexError::io(format!("reading {}", path.display()), e)),
        }
        file.rewind()
            .map_err(|e| IndexError::io(format!("rewinding {}", path.display()), e))?;

        Ok(Self {
            path: path.to_path_buf(),
            decoder: MultiGzDecoder::new(file),
        })
    }

    /// Path of the file being decoded
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream all decompressed bytes into `out`, stopping early with
    /// `Cancelled` once `cancel` fires.
    ///
    /// Decoding failures are reported as `Corrupt`, failures writing to `out`
    /// as `Io`.
    pub fn copy_to<W: Write + ?Sized>(
        mut self,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> IndexResult<u64> {
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut total = 0u64;
        loop {
            if cancel.is_cancelled() {
                return Err(IndexError::Cancelled);
            }
            let n = match self.decoder.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.read_error(e)),
            };
            out.write_all(&buf[..n])
                .map_err(|e| IndexError::io("writing decompressed output", e))?;
            total += n as u64;
        }
        out.flush()
            .map_err(|e| IndexError::io("flushing decompressed output", e))?;
        Ok(total)
    }

    /// Decompress the whole file into memory
    pub fn read_to_vec(self) -> IndexResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.copy_to(&mut buf, &CancellationToken::new())?;
        Ok(buf)
    }

    fn read_error(&self, e: io::Error) -> IndexError {
        match e.kind() {
            io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::UnexpectedEof => corrupt(&self.path, e.to_string()),
            _ => IndexError::io(format!("reading {}", self.path.display()), e),
        }
    }
}

impl Read for GzipReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.decoder.read(buf)
    }
}

fn corrupt(path: &Path, reason: impl Into<String>) -> IndexError {
    IndexError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
