//! Image reconstruction: geometry selection, magnitude normalization,
//! and 8-bit grayscale assembly.

use log::{debug, warn};

use crate::{fft, AcquisitionHeader, Error, Mrd};

/// Reconstruction geometry derived from the acquisition dimensions.
///
/// A 3-D acquisition (`slices == 1`) is sliced along the second
/// phase-encode axis; a multi-slice acquisition is sliced along the
/// slice axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconLayout {
    /// Volume indexed `(views, views2, samples)`, one image per views2.
    SingleVolume {
        views: usize,
        views2: usize,
        samples: usize,
    },
    /// Volume indexed `(slices, views, samples)`, one image per slice.
    MultiSlice {
        slices: usize,
        views: usize,
        samples: usize,
    },
}

impl ReconLayout {
    pub fn from_header(header: &AcquisitionHeader) -> Self {
        if header.slices == 1 {
            Self::SingleVolume {
                views: header.views as usize,
                views2: header.views2 as usize,
                samples: header.samples as usize,
            }
        } else {
            Self::MultiSlice {
                slices: header.slices as usize,
                views: header.views as usize,
                samples: header.samples as usize,
            }
        }
    }

    /// Row-major FFT shape of the reconstruction volume.
    pub fn shape(&self) -> [usize; 3] {
        match *self {
            Self::SingleVolume {
                views,
                views2,
                samples,
            } => [views, views2, samples],
            Self::MultiSlice {
                slices,
                views,
                samples,
            } => [slices, views, samples],
        }
    }

    pub fn image_count(&self) -> usize {
        match *self {
            Self::SingleVolume { views2, .. } => views2,
            Self::MultiSlice { slices, .. } => slices,
        }
    }

    /// Pixel geometry `(width, height)` shared by every image.
    pub fn image_size(&self) -> (usize, usize) {
        match *self {
            Self::SingleVolume { views, samples, .. } => (samples, views),
            Self::MultiSlice { views, samples, .. } => (samples, views),
        }
    }

    /// Flat magnitude index backing pixel `(row, col)` of image `image`.
    fn magnitude_index(&self, image: usize, row: usize, col: usize) -> usize {
        match *self {
            Self::SingleVolume {
                views2, samples, ..
            } => (row * views2 + image) * samples + col,
            Self::MultiSlice { views, samples, .. } => (image * views + row) * samples + col,
        }
    }
}

/// One 8-bit single-channel raster image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    /// Row-major pixels, `width * height` bytes.
    pub pixels: Vec<u8>,
}

impl GrayImage {
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> u8 {
        self.pixels[row * self.width + col]
    }
}

/// Ordered image sequence produced by one reconstruction call.
///
/// Index order follows the scan geometry (views2 or slice order) and
/// must be preserved for display correlation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageStack {
    images: Vec<GrayImage>,
}

impl ImageStack {
    #[inline]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&GrayImage> {
        self.images.get(index)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, GrayImage> {
        self.images.iter()
    }

    #[inline]
    pub fn into_vec(self) -> Vec<GrayImage> {
        self.images
    }
}

impl IntoIterator for ImageStack {
    type Item = GrayImage;
    type IntoIter = std::vec::IntoIter<GrayImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}

impl<'a> IntoIterator for &'a ImageStack {
    type Item = &'a GrayImage;
    type IntoIter = std::slice::Iter<'a, GrayImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

impl Mrd {
    /// Reconstruct this acquisition into grayscale images.
    ///
    /// Runs the full pipeline: layout selection, forward 3-D FFT,
    /// fftshift recentering, magnitude extraction, and normalization of
    /// the global maximum to 255. An all-zero magnitude volume yields
    /// all-zero pixels rather than a division by zero.
    pub fn reconstruct(&self) -> Result<ImageStack, Error> {
        let layout = ReconLayout::from_header(self.header());
        let shape = layout.shape();
        let volume_len = shape.iter().product::<usize>();
        debug!("reconstructing {layout:?}");

        // sample_count is a multiple of the shape product, so the
        // reconstruction volume is always in range.
        let volume = &self.kspace()[..volume_len];
        let spectrum = fft::fft3(volume, shape)?;
        let centered = fft::fftshift3(&spectrum, shape)?;
        let mag = fft::magnitude(&centered)?;

        let max = mag.iter().copied().fold(0.0_f64, f64::max);
        if max == 0.0 {
            warn!("all-zero magnitude volume, emitting blank images");
        }

        let (width, height) = layout.image_size();
        let mut images = Vec::new();
        images
            .try_reserve_exact(layout.image_count())
            .map_err(|_| Error::OutOfMemory(layout.image_count()))?;

        for i in 0..layout.image_count() {
            let mut pixels = Vec::new();
            pixels
                .try_reserve_exact(width * height)
                .map_err(|_| Error::OutOfMemory(width * height))?;
            for j in 0..height {
                for k in 0..width {
                    pixels.push(scale_pixel(mag[layout.magnitude_index(i, j, k)], max));
                }
            }
            images.push(GrayImage {
                width,
                height,
                pixels,
            });
        }

        Ok(ImageStack { images })
    }
}

#[inline]
fn scale_pixel(value: f64, max: f64) -> u8 {
    if max == 0.0 {
        return 0;
    }
    (value * 255.0 / max).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(samples: u32, views: u32, views2: u32, slices: u32) -> AcquisitionHeader {
        AcquisitionHeader {
            samples,
            views,
            views2,
            slices,
            data_type: 5,
            echoes: 1,
            experiments: 1,
        }
    }

    #[test]
    fn test_layout_single_volume() {
        let layout = ReconLayout::from_header(&header(64, 32, 4, 1));
        assert_eq!(
            layout,
            ReconLayout::SingleVolume {
                views: 32,
                views2: 4,
                samples: 64
            }
        );
        assert_eq!(layout.shape(), [32, 4, 64]);
        assert_eq!(layout.image_count(), 4);
        assert_eq!(layout.image_size(), (64, 32));
    }

    #[test]
    fn test_layout_multi_slice() {
        let layout = ReconLayout::from_header(&header(64, 32, 1, 8));
        assert_eq!(
            layout,
            ReconLayout::MultiSlice {
                slices: 8,
                views: 32,
                samples: 64
            }
        );
        assert_eq!(layout.shape(), [8, 32, 64]);
        assert_eq!(layout.image_count(), 8);
        assert_eq!(layout.image_size(), (64, 32));
    }

    #[test]
    fn test_magnitude_index() {
        // Single volume reads (row, image, col) in (views, views2, samples).
        let layout = ReconLayout::SingleVolume {
            views: 3,
            views2: 2,
            samples: 5,
        };
        assert_eq!(layout.magnitude_index(1, 2, 4), (2 * 2 + 1) * 5 + 4);

        // Multi-slice reads (image, row, col) in (slices, views, samples).
        let layout = ReconLayout::MultiSlice {
            slices: 2,
            views: 3,
            samples: 5,
        };
        assert_eq!(layout.magnitude_index(1, 2, 4), (1 * 3 + 2) * 5 + 4);
    }

    #[test]
    fn test_scale_pixel_bounds() {
        assert_eq!(scale_pixel(10.0, 10.0), 255);
        assert_eq!(scale_pixel(0.0, 10.0), 0);
        assert_eq!(scale_pixel(5.0, 10.0), 128);
        // Zero maximum is defined as black, not a division by zero.
        assert_eq!(scale_pixel(0.0, 0.0), 0);
    }
}
