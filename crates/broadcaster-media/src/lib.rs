//! Raw planar frame buffers and comparison helpers.
//!
//! Pure and synchronous; the session core only touches these through
//! test fixtures.

mod frame;

pub use frame::{
    frames_equal, nv12_frames_equal, planes_equal, planes_equal_strided, I420Buffer, MediaError,
    Nv12Buffer,
};

/// Result type for media-buffer operations.
pub type MediaResult<T> = Result<T, MediaError>;
