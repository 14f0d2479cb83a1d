use crate::{Error, SampleType};

/// Fixed-offset scalar fields of an MRD acquisition header.
///
/// All integer fields are stored little-endian in the raw buffer. The
/// six dimension fields together give the k-space sample count; the
/// data type code describes how payload elements are encoded (low
/// nibble = element kind, bit `0x10` = complex-interleaved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionHeader {
    /// Readout points per view (byte offset 0)
    pub samples: u32,
    /// Phase-encode steps (byte offset 4)
    pub views: u32,
    /// Second phase-encode steps (byte offset 8)
    pub views2: u32,
    /// Slice count (byte offset 12)
    pub slices: u32,
    /// Raw data type code (byte offset 18)
    pub data_type: u16,
    /// Echo count (byte offset 152)
    pub echoes: u32,
    /// Experiment count (byte offset 156)
    pub experiments: u32,
}

impl AcquisitionHeader {
    /// Byte span covering every fixed header field.
    pub const MIN_SPAN: usize = 160;

    /// Offset, in bytes, from buffer start to the first payload element.
    pub const DATA_OFFSET: usize = 512;

    /// Decode the fixed header fields from the start of a raw buffer.
    ///
    /// Bytes 16-17 and 20-151 are reserved and left uninterpreted.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < Self::MIN_SPAN {
            return Err(Error::TruncatedHeader {
                needed: Self::MIN_SPAN,
                actual: bytes.len(),
            });
        }

        let u32_at = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };
        let u16_at = |offset: usize| u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);

        Ok(Self {
            samples: u32_at(0),
            views: u32_at(4),
            views2: u32_at(8),
            slices: u32_at(12),
            data_type: u16_at(18),
            echoes: u32_at(152),
            experiments: u32_at(156),
        })
    }

    /// Encode the fixed header fields into the start of a buffer.
    ///
    /// Reserved byte ranges are left untouched.
    pub fn encode_into(&self, out: &mut [u8]) -> Result<(), Error> {
        if out.len() < Self::MIN_SPAN {
            return Err(Error::TruncatedHeader {
                needed: Self::MIN_SPAN,
                actual: out.len(),
            });
        }

        out[0..4].copy_from_slice(&self.samples.to_le_bytes());
        out[4..8].copy_from_slice(&self.views.to_le_bytes());
        out[8..12].copy_from_slice(&self.views2.to_le_bytes());
        out[12..16].copy_from_slice(&self.slices.to_le_bytes());
        out[18..20].copy_from_slice(&self.data_type.to_le_bytes());
        out[152..156].copy_from_slice(&self.echoes.to_le_bytes());
        out[156..160].copy_from_slice(&self.experiments.to_le_bytes());
        Ok(())
    }

    /// The six acquisition dimensions, slowest first.
    #[inline]
    pub fn dimensions(&self) -> [u32; 6] {
        [
            self.experiments,
            self.echoes,
            self.slices,
            self.views,
            self.views2,
            self.samples,
        ]
    }

    /// Number of complex k-space samples the header implies.
    ///
    /// A zero dimension or an overflowing product is rejected; the
    /// format carries no legitimate empty acquisitions.
    pub fn sample_count(&self) -> Result<usize, Error> {
        let dims = self.dimensions();
        if dims.iter().any(|&d| d == 0) {
            return Err(Error::InvalidDimensions);
        }
        dims.iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d as usize))
            .ok_or(Error::InvalidDimensions)
    }

    /// Element kind from the low nibble of the data type code.
    #[inline]
    pub fn sample_type(&self) -> Result<SampleType, Error> {
        SampleType::from_code(self.data_type & 0xF)
            .ok_or(Error::UnsupportedDataType(self.data_type))
    }

    /// True when payload elements are interleaved real/imaginary pairs.
    #[inline]
    pub fn is_complex(&self) -> bool {
        self.data_type & 0x10 != 0
    }
}
