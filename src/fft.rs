//! 3-D Fourier operations over contiguous complex volumes.
//!
//! Volumes are row-major `[d0, d1, d2]` with the last axis contiguous.
//! The forward transform is unnormalized, matching FFTW's default
//! convention the scanner pipeline was built against.

use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::Error;

/// Unnormalized forward 3-D DFT into a freshly allocated buffer.
///
/// The transform runs one `rustfft` pass per axis: contiguous rows
/// along axis 2, then gather/scatter lines along axes 1 and 0.
///
/// # Panics
/// Panics if `data.len()` differs from the shape product.
pub fn fft3(data: &[Complex64], shape: [usize; 3]) -> Result<Vec<Complex64>, Error> {
    let [d0, d1, d2] = shape;
    assert_eq!(data.len(), d0 * d1 * d2, "volume length must match shape");
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    out.try_reserve_exact(data.len())
        .map_err(|_| Error::OutOfMemory(data.len()))?;
    out.extend_from_slice(data);

    let mut planner = FftPlanner::new();

    // Axis 2: rows are contiguous runs of d2.
    let fft2 = planner.plan_fft_forward(d2);
    let mut scratch = vec![Complex64::new(0.0, 0.0); fft2.get_inplace_scratch_len()];
    for row in out.chunks_exact_mut(d2) {
        fft2.process_with_scratch(row, &mut scratch);
    }

    // Axis 1: lines with stride d2 inside each axis-0 plane.
    let fft1 = planner.plan_fft_forward(d1);
    let mut scratch = vec![Complex64::new(0.0, 0.0); fft1.get_inplace_scratch_len()];
    let mut line = vec![Complex64::new(0.0, 0.0); d1];
    for i0 in 0..d0 {
        for i2 in 0..d2 {
            for i1 in 0..d1 {
                line[i1] = out[(i0 * d1 + i1) * d2 + i2];
            }
            fft1.process_with_scratch(&mut line, &mut scratch);
            for i1 in 0..d1 {
                out[(i0 * d1 + i1) * d2 + i2] = line[i1];
            }
        }
    }

    // Axis 0: lines with stride d1 * d2.
    let fft0 = planner.plan_fft_forward(d0);
    let mut scratch = vec![Complex64::new(0.0, 0.0); fft0.get_inplace_scratch_len()];
    let mut line = vec![Complex64::new(0.0, 0.0); d0];
    for i1 in 0..d1 {
        for i2 in 0..d2 {
            for i0 in 0..d0 {
                line[i0] = out[(i0 * d1 + i1) * d2 + i2];
            }
            fft0.process_with_scratch(&mut line, &mut scratch);
            for i0 in 0..d0 {
                out[(i0 * d1 + i1) * d2 + i2] = line[i0];
            }
        }
    }

    Ok(out)
}

/// Circularly shift a volume by `dim / 2` along every axis so the DC
/// bin lands at the geometric center.
///
/// Writes through an explicit index permutation into a fresh buffer;
/// every element's destination depends on a coordinate transform, so an
/// in-place swap scheme cannot express it. For odd axes the shift
/// rounds down and is not self-inverse, per standard fftshift
/// semantics.
///
/// # Panics
/// Panics if `data.len()` differs from the shape product.
pub fn fftshift3(data: &[Complex64], shape: [usize; 3]) -> Result<Vec<Complex64>, Error> {
    let [d0, d1, d2] = shape;
    assert_eq!(data.len(), d0 * d1 * d2, "volume length must match shape");
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let (s0, s1, s2) = (d0 / 2, d1 / 2, d2 / 2);

    let mut out = Vec::new();
    out.try_reserve_exact(data.len())
        .map_err(|_| Error::OutOfMemory(data.len()))?;
    out.resize(data.len(), Complex64::new(0.0, 0.0));

    for i0 in 0..d0 {
        for i1 in 0..d1 {
            for i2 in 0..d2 {
                let src = (i0 * d1 + i1) * d2 + i2;
                let dst = (((i0 + s0) % d0) * d1 + (i1 + s1) % d1) * d2 + (i2 + s2) % d2;
                out[dst] = data[src];
            }
        }
    }
    Ok(out)
}

/// Element-wise magnitude `sqrt(re² + im²)`.
pub fn magnitude(data: &[Complex64]) -> Result<Vec<f64>, Error> {
    let mut out = Vec::new();
    out.try_reserve_exact(data.len())
        .map_err(|_| Error::OutOfMemory(data.len()))?;
    out.extend(data.iter().map(|c| c.norm()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_transforms_flat() {
        // A single nonzero sample anywhere gives a constant-magnitude
        // spectrum, the analytic transform of an impulse.
        let shape = [4, 4, 4];
        let mut volume = vec![Complex64::new(0.0, 0.0); 64];
        volume[13] = Complex64::new(2.5, 0.0);

        let spectrum = fft3(&volume, shape).unwrap();
        assert_eq!(spectrum.len(), 64);
        for bin in &spectrum {
            assert!((bin.norm() - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dc_bin_collects_sum() {
        let shape = [2, 2, 2];
        let volume = vec![Complex64::new(1.0, 0.0); 8];
        let spectrum = fft3(&volume, shape).unwrap();

        assert!((spectrum[0].re - 8.0).abs() < 1e-9);
        for bin in &spectrum[1..] {
            assert!(bin.norm() < 1e-9);
        }
    }

    #[test]
    fn test_fftshift_moves_dc_to_center() {
        let shape = [4, 6, 8];
        let mut volume = vec![Complex64::new(0.0, 0.0); 4 * 6 * 8];
        volume[0] = Complex64::new(1.0, 0.0);

        let shifted = fftshift3(&volume, shape).unwrap();
        let center = (2 * 6 + 3) * 8 + 4;
        assert_eq!(shifted[center], Complex64::new(1.0, 0.0));
        assert_eq!(shifted.iter().filter(|c| c.norm() > 0.0).count(), 1);
    }

    #[test]
    fn test_fftshift_even_axes_involution() {
        let shape = [4, 2, 6];
        let volume: Vec<Complex64> = (0..4 * 2 * 6)
            .map(|i| Complex64::new(i as f64, -(i as f64)))
            .collect();

        let once = fftshift3(&volume, shape).unwrap();
        let twice = fftshift3(&once, shape).unwrap();
        assert_eq!(twice, volume);
    }

    #[test]
    fn test_fftshift_odd_axis_not_involutive() {
        let shape = [3, 1, 1];
        let volume: Vec<Complex64> =
            (0..3).map(|i| Complex64::new(i as f64, 0.0)).collect();

        let once = fftshift3(&volume, shape).unwrap();
        let twice = fftshift3(&once, shape).unwrap();
        assert_ne!(twice, volume);
    }

    #[test]
    fn test_magnitude() {
        let data = vec![Complex64::new(3.0, -4.0), Complex64::new(0.0, 0.0)];
        let mag = magnitude(&data).unwrap();
        assert_eq!(mag, vec![5.0, 0.0]);
    }
}
