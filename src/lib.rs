//! Reader and reconstruction pipeline for the MRD scanner acquisition
//! format: a fixed 512-byte header followed by a typed, optionally
//! complex-interleaved k-space payload. Decoded acquisitions are turned
//! into grayscale images via an unnormalized forward 3-D FFT, an
//! fftshift recentering pass, and magnitude normalization to 8-bit.

mod acquisition;
mod fft;
mod header;
mod recon;
mod sample;

#[cfg(test)]
#[path = "../test/tests.rs"]
mod tests;

pub use acquisition::Mrd;
pub use fft::{fft3, fftshift3, magnitude};
pub use header::AcquisitionHeader;
pub use recon::{GrayImage, ImageStack, ReconLayout};
pub use sample::SampleType;

// Error type

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Buffer ends before the last fixed header field.
    #[error("buffer too short for MRD header: need {needed} bytes, have {actual}")]
    TruncatedHeader { needed: usize, actual: usize },
    /// Low nibble of the data type code is outside the known set.
    #[error("unsupported MRD data type code {0:#x}")]
    UnsupportedDataType(u16),
    /// A header dimension is zero, or their product overflows.
    #[error("acquisition dimensions are zero or out of range")]
    InvalidDimensions,
    /// Payload holds fewer raw elements than the header implies.
    #[error("payload holds {available} raw elements, header implies {expected}")]
    InsufficientData { expected: usize, available: usize },
    /// A k-space or image buffer could not be allocated.
    #[error("failed to allocate a buffer of {0} elements")]
    OutOfMemory(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
