use num_complex::Complex64;
use realfft::RealFftPlanner;

use crate::error::Result;

/// Centre frequency of every bin of a length-`len` real FFT, from DC up to
/// `sample_rate/2` (`len/2 + 1` entries).
pub fn bin_frequencies(len: usize, sample_rate: f64) -> Vec<f64> {
    let bin_width = sample_rate / len as f64;
    (0..=len / 2).map(|i| i as f64 * bin_width).collect()
}

/// Index of the bin whose frequency is closest to `freq_hz`, found by binary
/// search over an ascending `bins` table. Ties go to the lower bin.
pub fn nearest_bin(bins: &[f64], freq_hz: f64) -> Option<usize> {
    if bins.is_empty() || freq_hz.is_nan() {
        return None;
    }
    let upper = bins.partition_point(|&f| f < freq_hz);
    if upper == 0 {
        return Some(0);
    }
    if upper == bins.len() {
        return Some(bins.len() - 1);
    }
    let lower = upper - 1;
    if freq_hz - bins[lower] <= bins[upper] - freq_hz {
        Some(lower)
    } else {
        Some(upper)
    }
}

/// Real-to-complex FFT of `signal` (`len/2 + 1` bins, unnormalised).
pub fn forward(signal: &[f64]) -> Result<Vec<Complex64>> {
    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(signal.len());

    let mut input = signal.to_vec();
    let mut spectrum = r2c.make_output_vec();
    r2c.process(&mut input, &mut spectrum)?;

    Ok(spectrum
        .into_iter()
        .map(|c| Complex64::new(c.re, c.im))
        .collect())
}

/// Complex-to-real inverse FFT producing `len` samples, scaled by `1/len` so
/// that `inverse(forward(x)) == x`.
pub fn inverse(spectrum: &[Complex64], len: usize) -> Result<Vec<f64>> {
    let mut planner = RealFftPlanner::<f64>::new();
    let c2r = planner.plan_fft_inverse(len);

    let mut bins: Vec<_> = spectrum
        .iter()
        .map(|&c| realfft::num_complex::Complex { re: c.re, im: c.im })
        .collect();

    // realfft requires DC (and Nyquist, for even lengths) to be purely real.
    bins[0].im = 0.0;
    if len % 2 == 0 {
        let last = bins.len() - 1;
        bins[last].im = 0.0;
    }

    let mut output = vec![0.0f64; len];
    c2r.process(&mut bins, &mut output)?;

    let norm = 1.0 / len as f64;
    for s in &mut output {
        *s *= norm;
    }
    Ok(output)
}

/// Largest absolute sample value (0 for an empty signal).
pub fn peak(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0f64, |acc, &s| acc.max(s.abs()))
}

/// Scale `signal` so its peak magnitude is exactly 1. An all-zero (or
/// non-finite) signal is left untouched.
pub fn peak_normalize(signal: &mut [f64]) {
    let max = peak(signal);
    if !(max > 0.0) || !max.is_finite() {
        return;
    }
    for s in signal.iter_mut() {
        *s /= max;
    }
}
