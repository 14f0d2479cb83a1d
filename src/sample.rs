/// Payload element kind, selected by the low nibble of the header's
/// data type code. Codes 2 and 3 both map to 16-bit signed integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SampleType {
    Uint8,
    Int8,
    Int16,
    Int32,
    Float32,
    Float64,
}

impl SampleType {
    #[inline]
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Uint8),
            1 => Some(Self::Int8),
            2 | 3 => Some(Self::Int16),
            4 => Some(Self::Int32),
            5 => Some(Self::Float32),
            6 => Some(Self::Float64),
            _ => None,
        }
    }

    #[inline]
    pub fn byte_size(&self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Uint8 | Self::Int8 | Self::Int16 | Self::Int32)
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}
