//! Memory-mapped append arena
//!
//! One contiguous writable mapping over a file, with a `used` cursor and a
//! `capacity` that grows in whole pages. Growing drops the mapping, extends
//! the file and maps it again before any byte of the new line is copied.
//! Closing truncates the file back to `used`.

use crate::core::error::{LoggerError, Result};
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Growth unit of the mapped region
pub const PAGE_SIZE: u64 = 4096;

/// Pages needed so that `used + msize` fits, given the current capacity
pub fn required_pages(used: u64, msize: u64, capacity: u64) -> u64 {
    (used + msize).saturating_sub(capacity).div_ceil(PAGE_SIZE)
}

pub struct MappedFile {
    path: PathBuf,
    file: File,
    mmap: Option<MmapMut>,
    used: u64,
    capacity: u64,
}

impl MappedFile {
    /// Create a new file and map one page of it
    ///
    /// Fails if the file already exists, so an earlier file is never
    /// truncated by a rotation landing on the same name.
    pub fn create_new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        Self::with_file(path, file, 0)
    }

    /// Create a file, discarding any previous content
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "create log file",
                    format!("Failed to create '{}'", path.display()),
                    e,
                )
            })?;
        Self::with_file(path, file, 0)
    }

    /// Open or create a file and keep appending after its current content
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "open log file",
                    format!("Failed to open '{}'", path.display()),
                    e,
                )
            })?;
        let used = file.metadata()?.len();
        Self::with_file(path, file, used)
    }

    fn with_file(path: &Path, file: File, used: u64) -> Result<Self> {
        let mut mapped = Self {
            path: path.to_path_buf(),
            file,
            mmap: None,
            used,
            capacity: 0,
        };
        let pages = required_pages(used, 0, 0).max(1);
        mapped.remap(pages * PAGE_SIZE)?;
        Ok(mapped)
    }

    /// Append `bytes`, growing the mapping first when they do not fit
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let msize = bytes.len() as u64;
        if self.mmap.is_none() || self.used + msize > self.capacity {
            let pages = required_pages(self.used, msize, self.capacity);
            self.remap(self.capacity + pages * PAGE_SIZE)?;
        }
        let mmap = self
            .mmap
            .as_mut()
            .ok_or_else(|| LoggerError::mapping(self.path.display().to_string(), "no mapping"))?;
        let start = self.used as usize;
        mmap[start..start + bytes.len()].copy_from_slice(bytes);
        self.used += msize;
        Ok(())
    }

    /// Schedule dirty pages for write-back
    pub fn flush(&self) -> Result<()> {
        if let Some(mmap) = &self.mmap {
            mmap.flush_async()?;
        }
        Ok(())
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remap(&mut self, capacity: u64) -> Result<()> {
        // the old view must be gone before the file length changes
        self.mmap = None;
        grow_file(&self.file, capacity).map_err(|e| {
            LoggerError::mapping(
                self.path.display().to_string(),
                format!("cannot grow to {} bytes: {}", capacity, e),
            )
        })?;
        // SAFETY: the file is created and owned by this process; other
        // processes only read it, and its length is only changed by `remap`
        // and `Drop` while no view is alive.
        let mmap = unsafe { MmapMut::map_mut(&self.file) }.map_err(|e| {
            LoggerError::mapping(self.path.display().to_string(), e.to_string())
        })?;
        self.mmap = Some(mmap);
        self.capacity = capacity;
        Ok(())
    }
}

impl Drop for MappedFile {
    fn drop(&mut self) {
        if let Some(mmap) = self.mmap.take() {
            if let Err(e) = mmap.flush() {
                eprintln!(
                    "[LOGGER WARNING] Failed to flush '{}' on close: {}",
                    self.path.display(),
                    e
                );
            }
        }
        if let Err(e) = self.file.set_len(self.used) {
            eprintln!(
                "[LOGGER WARNING] Failed to truncate '{}' to {} bytes: {}",
                self.path.display(),
                self.used,
                e
            );
        }
    }
}

/// Extend the file to `len` bytes, reserving the blocks up front when the
/// platform allows it so a full disk surfaces here and not as a fault inside
/// the mapping
#[cfg(feature = "file")]
fn grow_file(file: &File, len: u64) -> io::Result<()> {
    use fs2::FileExt;
    if file.allocate(len).is_err() {
        file.set_len(len)?;
    }
    if file.metadata()?.len() < len {
        file.set_len(len)?;
    }
    Ok(())
}

#[cfg(not(feature = "file"))]
fn grow_file(file: &File, len: u64) -> io::Result<()> {
    file.set_len(len)
}
