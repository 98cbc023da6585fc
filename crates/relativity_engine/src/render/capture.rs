//! Screenshot capture to uncompressed TGA
//!
//! Files are written as `<dir>/screenshot<N>.tga` with `N` counting up from
//! zero for the lifetime of the writer. The image is 24-bit true color with
//! the 18-byte header laid out as nine little-endian `u16` values:
//! `{0, 2, 0, 0, 0, 0, width, height, 24}`. Pixel data is BGR, bottom row
//! first, exactly as read back from the framebuffer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::backend::{BackendError, RenderBackend};

/// Size of the TGA header in bytes
pub const TGA_HEADER_LEN: usize = 18;

/// Errors produced while capturing a screenshot
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// The framebuffer is larger than the format can describe
    #[error("framebuffer {width}x{height} does not fit a TGA header")]
    DimensionsTooLarge {
        /// Framebuffer width
        width: u32,
        /// Framebuffer height
        height: u32,
    },

    /// Pixel data length does not match the dimensions
    #[error("expected {expected} bytes of pixel data, got {actual}")]
    BufferSize {
        /// `width * height * 3`
        expected: usize,
        /// Bytes provided
        actual: usize,
    },

    /// The backend could not read the framebuffer
    #[error("framebuffer readback failed: {0}")]
    Readback(#[from] BackendError),

    /// The file could not be written
    #[error("failed to write screenshot '{path}': {source}")]
    Io {
        /// Target file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Build the 18-byte header of an uncompressed 24-bit TGA image
pub fn tga_header(width: u16, height: u16) -> [u8; TGA_HEADER_LEN] {
    let fields: [u16; 9] = [0, 2, 0, 0, 0, 0, width, height, 24];

    let mut header = [0u8; TGA_HEADER_LEN];
    for (chunk, field) in header.chunks_exact_mut(2).zip(fields) {
        chunk.copy_from_slice(&field.to_le_bytes());
    }
    header
}

/// Write a BGR image as TGA to `path`
pub fn write_tga(path: &Path, width: u32, height: u32, bgr: &[u8]) -> Result<(), CaptureError> {
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(CaptureError::DimensionsTooLarge { width, height });
    };

    let expected = width as usize * height as usize * 3;
    if bgr.len() != expected {
        return Err(CaptureError::BufferSize { expected, actual: bgr.len() });
    }

    let io_error = |source| CaptureError::Io { path: path.to_path_buf(), source };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&tga_header(w, h)).map_err(io_error)?;
    writer.write_all(bgr).map_err(io_error)?;
    writer.flush().map_err(io_error)?;

    Ok(())
}

/// Numbered screenshot writer
#[derive(Debug, Clone)]
pub struct ScreenshotWriter {
    directory: PathBuf,
    next_index: u32,
}

impl ScreenshotWriter {
    /// Create a writer targeting `directory`; the directory is created on first capture
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            next_index: 0,
        }
    }

    /// Path the next capture will be written to
    pub fn next_path(&self) -> PathBuf {
        self.directory.join(format!("screenshot{}.tga", self.next_index))
    }

    /// Number of screenshots written so far
    pub fn captured(&self) -> u32 {
        self.next_index
    }

    /// Read the framebuffer through `backend` and write the next screenshot
    pub fn capture(
        &mut self,
        backend: &mut dyn RenderBackend,
        width: u32,
        height: u32,
    ) -> Result<PathBuf, CaptureError> {
        let pixels = backend.read_front_buffer(width, height)?;
        self.write(width, height, &pixels)
    }

    /// Write already read-back BGR pixels as the next screenshot
    pub fn write(&mut self, width: u32, height: u32, bgr: &[u8]) -> Result<PathBuf, CaptureError> {
        fs::create_dir_all(&self.directory).map_err(|source| CaptureError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.next_path();
        write_tga(&path, width, height, bgr)?;
        self.next_index += 1;

        log::info!("Saved screenshot {}", path.display());
        Ok(path)
    }
}
