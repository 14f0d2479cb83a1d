use log::debug;
use num_complex::Complex64;

use crate::{AcquisitionHeader, Error, SampleType};

/// One decoded MRD acquisition: the fixed header plus its k-space
/// samples promoted to complex doubles.
///
/// The sample buffer is owned and contiguous, ordered
/// `(experiments, echoes, slices, views, views2, samples)` row-major,
/// and its length always equals [`AcquisitionHeader::sample_count`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mrd {
    header: AcquisitionHeader,
    kspace: Vec<Complex64>,
}

impl Mrd {
    /// Decode a single acquisition from a raw MRD buffer.
    ///
    /// The payload is read from byte [`AcquisitionHeader::DATA_OFFSET`]
    /// onward; trailing bytes past the implied element count (further
    /// channel blocks, PPR text) are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let header = AcquisitionHeader::decode(bytes)?;
        let payload = bytes.get(AcquisitionHeader::DATA_OFFSET..).unwrap_or(&[]);
        let kspace = decode_kspace(payload, &header)?;
        debug!(
            "decoded MRD acquisition: {} samples, type {:#x}",
            kspace.len(),
            header.data_type
        );
        Ok(Self { header, kspace })
    }

    /// Decode every complete receiver-channel block in a raw buffer.
    ///
    /// Multi-coil scanners store one k-space block per channel back to
    /// back after the header, all with identical geometry. At least one
    /// complete block must be present.
    pub fn channels_from_bytes(bytes: &[u8]) -> Result<Vec<Self>, Error> {
        let header = AcquisitionHeader::decode(bytes)?;
        let n = header.sample_count()?;
        let ty = header.sample_type()?;
        let raw = raw_element_count(n, header.is_complex())?;
        let block = raw
            .checked_mul(ty.byte_size())
            .ok_or(Error::InvalidDimensions)?;

        let payload = bytes.get(AcquisitionHeader::DATA_OFFSET..).unwrap_or(&[]);
        let count = payload.len() / block;
        if count == 0 {
            return Err(Error::InsufficientData {
                expected: raw,
                available: payload.len() / ty.byte_size(),
            });
        }

        let mut channels = Vec::new();
        channels
            .try_reserve_exact(count)
            .map_err(|_| Error::OutOfMemory(count))?;
        for i in 0..count {
            let kspace = decode_kspace(&payload[i * block..], &header)?;
            channels.push(Self { header, kspace });
        }
        debug!("decoded {count} MRD channel(s) of {n} samples each");
        Ok(channels)
    }

    /// Read and decode a single-channel MRD file.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Read an MRD file and decode every channel block it contains.
    pub fn open_channels(path: impl AsRef<std::path::Path>) -> Result<Vec<Self>, Error> {
        let bytes = std::fs::read(path)?;
        Self::channels_from_bytes(&bytes)
    }

    #[inline]
    pub fn header(&self) -> &AcquisitionHeader {
        &self.header
    }

    #[inline]
    pub fn kspace(&self) -> &[Complex64] {
        &self.kspace
    }

    #[inline]
    pub fn into_kspace(self) -> Vec<Complex64> {
        self.kspace
    }
}

fn raw_element_count(n: usize, complex: bool) -> Result<usize, Error> {
    if complex {
        n.checked_mul(2).ok_or(Error::InvalidDimensions)
    } else {
        Ok(n)
    }
}

/// Interpret the payload region as typed elements and promote them to
/// complex doubles. `payload` starts at the first element of the block
/// being decoded; excess trailing bytes are ignored.
fn decode_kspace(
    payload: &[u8],
    header: &AcquisitionHeader,
) -> Result<Vec<Complex64>, Error> {
    let n = header.sample_count()?;
    let ty = header.sample_type()?;
    let complex = header.is_complex();

    match ty {
        SampleType::Uint8 => read_samples(payload, n, complex, |b: [u8; 1]| f64::from(b[0])),
        SampleType::Int8 => {
            read_samples(payload, n, complex, |b: [u8; 1]| f64::from(b[0] as i8))
        }
        SampleType::Int16 => read_samples(payload, n, complex, |b: [u8; 2]| {
            f64::from(i16::from_le_bytes(b))
        }),
        SampleType::Int32 => read_samples(payload, n, complex, |b: [u8; 4]| {
            f64::from(i32::from_le_bytes(b))
        }),
        SampleType::Float32 => read_samples(payload, n, complex, |b: [u8; 4]| {
            f64::from(f32::from_le_bytes(b))
        }),
        SampleType::Float64 => {
            read_samples(payload, n, complex, |b: [u8; 8]| f64::from_le_bytes(b))
        }
    }
}

fn read_samples<const W: usize>(
    payload: &[u8],
    n: usize,
    complex: bool,
    decode: impl Fn([u8; W]) -> f64,
) -> Result<Vec<Complex64>, Error> {
    let raw = raw_element_count(n, complex)?;
    let available = payload.len() / W;
    if available < raw {
        return Err(Error::InsufficientData {
            expected: raw,
            available,
        });
    }

    let mut kspace = Vec::new();
    kspace
        .try_reserve_exact(n)
        .map_err(|_| Error::OutOfMemory(n))?;

    if complex {
        for i in 0..n {
            let re = decode(element(payload, 2 * i));
            let im = decode(element(payload, 2 * i + 1));
            kspace.push(Complex64::new(re, im));
        }
    } else {
        for i in 0..n {
            kspace.push(Complex64::new(decode(element(payload, i)), 0.0));
        }
    }
    Ok(kspace)
}

#[inline]
fn element<const W: usize>(payload: &[u8], index: usize) -> [u8; W] {
    let mut arr = [0u8; W];
    arr.copy_from_slice(&payload[index * W..(index + 1) * W]);
    arr
}
