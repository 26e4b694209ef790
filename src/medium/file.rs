//! File-backed storage medium
//!
//! Treats a fixed-size image file as an EEPROM. The image is loaded into
//! memory on open; every byte that actually changes is written through to
//! the file at its offset.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{RecordError, Result};

use super::memory::ERASED_BYTE;
use super::StorageMedium;

/// An EEPROM image on disk
#[derive(Debug)]
pub struct FileMedium {
    path: PathBuf,
    file: File,
    image: Vec<u8>,
}

impl FileMedium {
    /// Open an existing image, using its current length as the medium size
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;

        let mut image = Vec::new();
        file.read_to_end(&mut image)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            image,
        })
    }

    /// Open an image, creating an erased one of `size` bytes if it doesn't exist
    ///
    /// An existing image must already be exactly `size` bytes long.
    pub fn open_or_create(path: &Path, size: usize) -> Result<Self> {
        if path.exists() {
            let medium = Self::open(path)?;
            if medium.image.len() != size {
                return Err(RecordError::Config(format!(
                    "Image {} is {} bytes, expected {}",
                    path.display(),
                    medium.image.len(),
                    size
                )));
            }
            return Ok(medium);
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        let image = vec![ERASED_BYTE; size];
        file.write_all(&image)?;
        file.sync_all()?;

        debug!(path = %path.display(), size, "created erased image");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            image,
        })
    }

    /// Path of the image file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush written bytes to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl StorageMedium for FileMedium {
    fn len(&self) -> usize {
        self.image.len()
    }

    fn read_byte(&self, addr: usize) -> Result<u8> {
        self.image.get(addr).copied().ok_or_else(|| {
            RecordError::Medium(format!(
                "Address {} beyond image of {} bytes",
                addr,
                self.image.len()
            ))
        })
    }

    fn write_if_different(&mut self, addr: usize, value: u8) -> Result<()> {
        let current = self.read_byte(addr)?;
        if current == value {
            return Ok(());
        }

        self.file.seek(SeekFrom::Start(addr as u64))?;
        self.file.write_all(&[value])?;
        self.image[addr] = value;
        Ok(())
    }
}
