use num_complex::Complex64;

use crate::error::Result;
use crate::spectrum;

/// Linear ("full") convolution of `signal` with `kernel`, truncated to the
/// first `out_len` samples. Computed with zero-padded real FFTs.
pub fn convolve_truncated(signal: &[f64], kernel: &[f64], out_len: usize) -> Result<Vec<f64>> {
    if signal.is_empty() || kernel.is_empty() || out_len == 0 {
        return Ok(vec![0.0; out_len]);
    }
    let full_len = signal.len() + kernel.len() - 1;
    let fft_size = full_len.next_power_of_two();

    let mut a = signal.to_vec();
    a.resize(fft_size, 0.0);
    let mut b = kernel.to_vec();
    b.resize(fft_size, 0.0);

    let spec_a = spectrum::forward(&a)?;
    let spec_b = spectrum::forward(&b)?;
    let product: Vec<Complex64> = spec_a.iter().zip(&spec_b).map(|(x, y)| x * y).collect();

    let mut out = spectrum::inverse(&product, fft_size)?;
    out.resize(out_len, 0.0);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Brute-force full convolution, `signal.len() + kernel.len() - 1` samples.
    fn convolve_direct(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
        if signal.is_empty() || kernel.is_empty() {
            return Vec::new();
        }
        let mut out = vec![0.0; signal.len() + kernel.len() - 1];
        for (i, &x) in signal.iter().enumerate() {
            if x == 0.0 {
                continue;
            }
            for (j, &h) in kernel.iter().enumerate() {
                out[i + j] += x * h;
            }
        }
        out
    }

    #[test]
    fn test_fft_matches_direct() {
        let signal: Vec<f64> = (0..37).map(|i| ((i * 7) % 11) as f64 - 5.0).collect();
        let kernel: Vec<f64> = (0..13).map(|i| 1.0 / (i as f64 + 1.0)).collect();
        let direct = convolve_direct(&signal, &kernel);
        let fast = convolve_truncated(&signal, &kernel, direct.len()).unwrap();
        assert_eq!(direct.len(), 49);
        for (i, (a, b)) in direct.iter().zip(&fast).enumerate() {
            assert!((a - b).abs() < 1e-9, "sample {i}: {a} vs {b}");
        }
    }

    #[test]
    fn test_delta_kernel_is_identity() {
        let signal = vec![0.3, -0.7, 0.1, 0.9];
        let out = convolve_truncated(&signal, &[1.0], signal.len()).unwrap();
        for (a, b) in signal.iter().zip(&out) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_delayed_delta_shifts_and_truncates() {
        let signal = vec![1.0, 2.0, 3.0, 4.0];
        let out = convolve_truncated(&signal, &[0.0, 0.0, 1.0], 4).unwrap();
        let expected = [0.0, 0.0, 1.0, 2.0];
        for (a, b) in expected.iter().zip(&out) {
            assert!((a - b).abs() < 1e-12, "{out:?}");
        }
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(convolve_truncated(&[], &[1.0], 3).unwrap(), vec![0.0; 3]);
        assert!(convolve_direct(&[1.0], &[]).is_empty());
    }
}
