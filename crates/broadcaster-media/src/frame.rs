//! Planar frame types and plane comparison.

use std::io::{self, Read};

use bytes::Bytes;
use thiserror::Error;

use crate::MediaResult;

/// Errors from reading or validating frame buffers.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Width or height unusable for the requested format.
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,

        /// Requested height.
        height: u32,
    },

    /// Source ended before a full frame was read.
    #[error("Unexpected end of frame data")]
    UnexpectedEof,

    /// Underlying IO failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// An I420 frame: full-resolution Y plane, quarter-resolution U and V.
#[derive(Debug, Clone)]
pub struct I420Buffer {
    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// Luma plane, tightly packed (stride == width).
    pub y: Bytes,

    /// Chroma U plane.
    pub u: Bytes,

    /// Chroma V plane.
    pub v: Bytes,
}

impl I420Buffer {
    /// Chroma plane dimensions for a given luma size.
    pub fn chroma_size(width: u32, height: u32) -> (u32, u32) {
        (width.div_ceil(2), height.div_ceil(2))
    }

    /// Total byte size of one I420 frame.
    pub fn frame_size(width: u32, height: u32) -> usize {
        let (cw, ch) = Self::chroma_size(width, height);
        (width as usize * height as usize) + 2 * (cw as usize * ch as usize)
    }

    /// Reads one tightly packed I420 frame from `source`.
    pub fn read(width: u32, height: u32, source: &mut impl Read) -> MediaResult<Self> {
        if width == 0 || height == 0 {
            return Err(MediaError::InvalidDimensions { width, height });
        }

        let (cw, ch) = Self::chroma_size(width, height);
        let y = read_plane(source, width as usize * height as usize)?;
        let u = read_plane(source, cw as usize * ch as usize)?;
        let v = read_plane(source, cw as usize * ch as usize)?;

        Ok(Self {
            width,
            height,
            y,
            u,
            v,
        })
    }
}

/// An NV12 frame: full-resolution Y plane, interleaved UV plane.
#[derive(Debug, Clone)]
pub struct Nv12Buffer {
    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// Luma plane, tightly packed.
    pub y: Bytes,

    /// Interleaved chroma plane.
    pub uv: Bytes,
}

impl Nv12Buffer {
    /// Total byte size of one NV12 frame.
    pub fn frame_size(width: u32, height: u32) -> usize {
        let y_size = width as usize * height as usize;
        let (cw, ch) = I420Buffer::chroma_size(width, height);
        y_size + 2 * (cw as usize * ch as usize)
    }

    /// Reads one tightly packed NV12 frame from `source`.
    pub fn read(width: u32, height: u32, source: &mut impl Read) -> MediaResult<Self> {
        if width == 0 || height == 0 {
            return Err(MediaError::InvalidDimensions { width, height });
        }

        let (cw, ch) = I420Buffer::chroma_size(width, height);
        let y = read_plane(source, width as usize * height as usize)?;
        let uv = read_plane(source, 2 * cw as usize * ch as usize)?;

        Ok(Self {
            width,
            height,
            y,
            uv,
        })
    }
}

fn read_plane(source: &mut impl Read, len: usize) -> MediaResult<Bytes> {
    let mut plane = vec![0u8; len];
    source.read_exact(&mut plane).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            MediaError::UnexpectedEof
        } else {
            MediaError::Io(e)
        }
    })?;
    Ok(Bytes::from(plane))
}

/// Row-wise plane comparison honoring distinct strides. Padding bytes
/// beyond `width` are ignored.
pub fn planes_equal_strided(
    a: &[u8],
    b: &[u8],
    stride_a: usize,
    stride_b: usize,
    width: usize,
    height: usize,
) -> bool {
    if stride_a < width || stride_b < width {
        return false;
    }
    if height > 0 {
        // Last row needs only `width` bytes, not a full stride.
        let needed_a = (height - 1) * stride_a + width;
        let needed_b = (height - 1) * stride_b + width;
        if a.len() < needed_a || b.len() < needed_b {
            return false;
        }
    }
    (0..height).all(|row| {
        let ra = &a[row * stride_a..row * stride_a + width];
        let rb = &b[row * stride_b..row * stride_b + width];
        ra == rb
    })
}

/// Plane comparison with a shared stride.
pub fn planes_equal(a: &[u8], b: &[u8], stride: usize, width: usize, height: usize) -> bool {
    planes_equal_strided(a, b, stride, stride, width, height)
}

/// Full-frame comparison of two I420 buffers.
pub fn frames_equal(a: &I420Buffer, b: &I420Buffer) -> bool {
    if a.width != b.width || a.height != b.height {
        return false;
    }
    let (w, h) = (a.width as usize, a.height as usize);
    let (cw, ch) = I420Buffer::chroma_size(a.width, a.height);
    let (cw, ch) = (cw as usize, ch as usize);

    planes_equal(&a.y, &b.y, w, w, h)
        && planes_equal(&a.u, &b.u, cw, cw, ch)
        && planes_equal(&a.v, &b.v, cw, cw, ch)
}

/// Full-frame comparison of two NV12 buffers.
pub fn nv12_frames_equal(a: &Nv12Buffer, b: &Nv12Buffer) -> bool {
    if a.width != b.width || a.height != b.height {
        return false;
    }
    let (w, h) = (a.width as usize, a.height as usize);
    let (cw, ch) = I420Buffer::chroma_size(a.width, a.height);
    let (uv_w, uv_h) = (2 * cw as usize, ch as usize);

    planes_equal(&a.y, &b.y, w, w, h) && planes_equal(&a.uv, &b.uv, uv_w, uv_w, uv_h)
}
