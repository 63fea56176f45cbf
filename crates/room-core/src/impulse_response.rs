use num_complex::Complex64;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::constants::{
    DECAY_LN_RATIO, GOLDEN_RATIO, HARMONIC_BOOST, MODAL_EMPHASIS_COUNT,
    REFLECTION_AMPLITUDE_RANGE, REFLECTION_TAP_COUNT, RT60_FLOOR,
};
use crate::convolution::convolve_truncated;
use crate::error::Result;
use crate::geometry::RoomGeometry;
use crate::modes::Mode;
use crate::reflections::{early_reflections, ReflectionTap};
use crate::rng::white_noise;
use crate::spectrum;

/// A synthetic, peak-normalised room impulse response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpulseResponse {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

impl ImpulseResponse {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_sec(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Inputs to [`synthesize`] that come out of the analytic stages.
#[derive(Debug, Clone)]
pub struct IrInputs<'a> {
    pub geometry: RoomGeometry,
    /// Broadband RT60 in seconds; floored at 0.2 s for the envelope.
    pub rt60: f64,
    pub absorption: f64,
    /// Modal summary, ascending in frequency.
    pub modes: &'a [Mode],
    pub sample_rate: u32,
    pub num_samples: usize,
}

/// Decay rate β such that `exp(−β·RT60) = 1/1000`.
pub fn decay_rate(rt60: f64) -> f64 {
    DECAY_LN_RATIO / rt60.max(RT60_FLOOR)
}

/// Gaussian noise shaped by `exp(−β·t)`.
pub fn decayed_noise<R: Rng + ?Sized>(
    rng: &mut R,
    num_samples: usize,
    sample_rate: f64,
    rt60: f64,
) -> Vec<f64> {
    let beta = decay_rate(rt60);
    let mut noise = white_noise(rng, num_samples);
    for (i, s) in noise.iter_mut().enumerate() {
        let t = i as f64 / sample_rate;
        *s *= (-beta * t).exp();
    }
    noise
}

/// Sparse impulse train with one spike per reflection tap. The direct path is
/// a unit spike at sample 0; later taps get random amplitudes. Arrivals past
/// the window are clamped onto its last sample.
pub fn reflection_train<R: Rng + ?Sized>(
    rng: &mut R,
    taps: &[ReflectionTap],
    num_samples: usize,
    sample_rate: f64,
) -> Vec<f64> {
    if num_samples == 0 {
        return Vec::new();
    }
    let positions: Vec<usize> = taps
        .iter()
        .map(|tap| {
            let idx = (tap.time_ms * sample_rate / 1000.0).round();
            if idx.is_finite() && idx > 0.0 {
                (idx as usize).min(num_samples - 1)
            } else {
                0
            }
        })
        .collect();

    let train_len = positions.iter().copied().max().unwrap_or(0) + 1;
    let mut train = vec![0.0; train_len];
    let (lo, hi) = REFLECTION_AMPLITUDE_RANGE;
    for (n, &pos) in positions.iter().enumerate() {
        let amplitude = if n == 0 { 1.0 } else { rng.gen_range(lo..hi) };
        train[pos] += amplitude;
    }
    train
}

/// Boost the spectrum around the lowest modes: the bin nearest each mode by
/// φ, and the bins nearest `mode·φ` and `mode·φ²` by a smaller factor when
/// they sit below Nyquist.
pub fn emphasize_modes(spectrum: &mut [Complex64], bins: &[f64], modes: &[Mode]) {
    let Some(&nyquist) = bins.last() else {
        return;
    };
    for mode in modes.iter().take(MODAL_EMPHASIS_COUNT) {
        let f = mode.frequency_hz;
        if f > nyquist {
            continue;
        }
        if let Some(k) = spectrum::nearest_bin(bins, f) {
            spectrum[k] *= GOLDEN_RATIO;
        }
        for harmonic in [f * GOLDEN_RATIO, f * GOLDEN_RATIO * GOLDEN_RATIO] {
            if harmonic >= nyquist {
                continue;
            }
            if let Some(k) = spectrum::nearest_bin(bins, harmonic) {
                spectrum[k] *= HARMONIC_BOOST;
            }
        }
    }
}

/// Build the impulse response: decayed noise convolved with the
/// early-reflection train, modal emphasis in the frequency domain, then peak
/// normalisation.
///
/// All randomness is drawn from `rng`, so a fixed seed reproduces the output
/// bit for bit.
pub fn synthesize<R: Rng + ?Sized>(inputs: &IrInputs<'_>, rng: &mut R) -> Result<ImpulseResponse> {
    let n = inputs.num_samples;
    let fs = inputs.sample_rate as f64;
    if n == 0 {
        return Ok(ImpulseResponse {
            samples: Vec::new(),
            sample_rate: inputs.sample_rate,
        });
    }

    let tail = decayed_noise(rng, n, fs, inputs.rt60);
    let taps = early_reflections(&inputs.geometry, inputs.absorption, REFLECTION_TAP_COUNT);
    let train = reflection_train(rng, &taps, n, fs);
    let raw = convolve_truncated(&tail, &train, n)?;

    let mut spec = spectrum::forward(&raw)?;
    let bins = spectrum::bin_frequencies(n, fs);
    emphasize_modes(&mut spec, &bins, inputs.modes);
    let mut samples = spectrum::inverse(&spec, n)?;
    spectrum::peak_normalize(&mut samples);

    debug!(
        samples = n,
        sample_rate = inputs.sample_rate,
        beta = decay_rate(inputs.rt60),
        emphasized = inputs.modes.len().min(MODAL_EMPHASIS_COUNT),
        "synthesized impulse response"
    );

    Ok(ImpulseResponse {
        samples,
        sample_rate: inputs.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::ReverberationProfile;
    use crate::constants::DEFAULT_BANDS;
    use crate::modes;
    use crate::rng::seeded;

    fn inputs(modes: &[Mode], num_samples: usize) -> IrInputs<'_> {
        IrInputs {
            geometry: RoomGeometry::new(10.47, 5.235, 5.827),
            rt60: 2.5,
            absorption: 0.073,
            modes,
            sample_rate: 8000,
            num_samples,
        }
    }

    fn kings_chamber_modes() -> Vec<Mode> {
        let profile = ReverberationProfile::from_bands(2.5, &DEFAULT_BANDS);
        modes::analyze(&RoomGeometry::new(10.47, 5.235, 5.827), 2000.0, 24, &profile)
    }

    #[test]
    fn test_decay_reaches_minus_60_db_at_rt60() {
        let beta = decay_rate(2.0);
        assert!(((-beta * 2.0f64).exp() - 1e-3).abs() < 1e-12);
        // Degenerate RT60 uses the 0.2 s floor.
        assert_eq!(decay_rate(0.0), decay_rate(0.2));
    }

    #[test]
    fn test_decayed_noise_envelope() {
        let fs = 1000.0;
        let noise = decayed_noise(&mut seeded(3), 2000, fs, 0.5);
        let early = spectrum::peak(&noise[..100]);
        let late = spectrum::peak(&noise[1000..]);
        assert!(late < early * 1e-3, "early {early}, late {late}");
    }

    #[test]
    fn test_reflection_train_positions() {
        let taps = [
            ReflectionTap { time_ms: 0.0, relative_energy: 0.9 },
            ReflectionTap { time_ms: 10.0, relative_energy: 0.1 },
            ReflectionTap { time_ms: 5000.0, relative_energy: 0.0 },
        ];
        let train = reflection_train(&mut seeded(1), &taps, 100, 1000.0);
        assert_eq!(train.len(), 100);
        assert_eq!(train[0], 1.0);
        assert!((0.2..0.8).contains(&train[10]));
        // Late tap clamped onto the final sample.
        assert!((0.2..0.8).contains(&train[99]));
        assert_eq!(train.iter().filter(|&&x| x != 0.0).count(), 3);
    }

    #[test]
    fn test_emphasis_scales_nearest_bins() {
        let bins = spectrum::bin_frequencies(1000, 1000.0);
        let mut spec = vec![Complex64::new(1.0, 0.0); bins.len()];
        let mode = Mode {
            frequency_hz: 100.0,
            nx: 1,
            ny: 0,
            nz: 0,
            kind: modes::ModeKind::Axial,
            bandwidth_hz: 1.0,
            gauss_sigma_hz: 0.4,
            relative_energy: 1.0,
        };
        emphasize_modes(&mut spec, &bins, &[mode]);
        assert!((spec[100].re - GOLDEN_RATIO).abs() < 1e-12);
        assert!((spec[162].re - HARMONIC_BOOST).abs() < 1e-12);
        assert!((spec[262].re - HARMONIC_BOOST).abs() < 1e-12);
        assert_eq!(spec[50].re, 1.0);
    }

    #[test]
    fn test_length_and_peak() {
        let modes = kings_chamber_modes();
        let ir = synthesize(&inputs(&modes, 8000), &mut seeded(42)).unwrap();
        assert_eq!(ir.len(), 8000);
        assert!((spectrum::peak(&ir.samples) - 1.0).abs() < 1e-12);
        assert!(ir.samples.iter().all(|s| s.is_finite()));
        assert!((ir.duration_sec() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_seeded_synthesis_is_bit_identical() {
        let modes = kings_chamber_modes();
        let a = synthesize(&inputs(&modes, 4000), &mut seeded(9)).unwrap();
        let b = synthesize(&inputs(&modes, 4000), &mut seeded(9)).unwrap();
        assert_eq!(a, b);
        let c = synthesize(&inputs(&modes, 4000), &mut seeded(10)).unwrap();
        assert_ne!(a.samples, c.samples);
    }

    #[test]
    fn test_energy_decays_over_time() {
        let ir = synthesize(&inputs(&[], 16000), &mut seeded(5)).unwrap();
        let head: f64 = ir.samples[..2000].iter().map(|s| s * s).sum();
        let tail: f64 = ir.samples[14000..].iter().map(|s| s * s).sum();
        assert!(tail < head * 0.01, "head {head}, tail {tail}");
    }
}
