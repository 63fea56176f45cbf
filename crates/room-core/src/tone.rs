use rand::Rng;
use serde::Serialize;
use std::f64::consts::PI;
use tracing::debug;

use crate::constants::{
    AIR_CUTOFF_MIN_HZ, AIR_CUTOFF_SPAN_HZ, AIR_NOISE_AMPLITUDE, GOLDEN_RATIO,
    REFERENCE_MAX_DIMENSION, SPEED_OF_SOUND,
};
use crate::convolution::convolve_truncated;
use crate::error::Result;
use crate::geometry::RoomGeometry;
use crate::impulse_response::ImpulseResponse;
use crate::rng::white_noise;
use crate::spectrum::peak_normalize;

/// Two-channel tone, each channel peak-normalised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneSignal {
    pub left: Vec<f64>,
    pub right: Vec<f64>,
    pub sample_rate: u32,
}

impl ToneSignal {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Interleaved `(left, right)` frames.
    pub fn frames(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.left.iter().copied().zip(self.right.iter().copied())
    }
}

/// Room-derived tuning of the tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneParameters {
    pub fundamental_hz: f64,
    pub binaural_delta_hz: f64,
    pub isochronic_rate_hz: f64,
    pub air_cutoff_hz: f64,
}

/// Lowest axial resonance of the longest dimension, scaled by φ and kept in
/// `[20, 100]` Hz.
pub fn fundamental(geometry: &RoomGeometry) -> f64 {
    ((SPEED_OF_SOUND / 2.0) / geometry.largest_dimension() * GOLDEN_RATIO).clamp(20.0, 100.0)
}

/// Right-ear detuning: `base/φ` kept in `[2, 8]` Hz.
pub fn binaural_delta(base_hz: f64) -> f64 {
    (base_hz / GOLDEN_RATIO).clamp(2.0, 8.0)
}

/// Pulse rate from the second-largest dimension, kept in `[2, 10]` Hz.
pub fn isochronic_rate(geometry: &RoomGeometry) -> f64 {
    ((SPEED_OF_SOUND / 2.0) / geometry.second_largest_dimension()).clamp(2.0, 10.0)
}

/// Low-pass cutoff of the air noise floor. Rooms close to the largest known
/// site get the darkest floor. `reference_max_dim` falls back to
/// [`REFERENCE_MAX_DIMENSION`] when absent or non-positive.
pub fn air_cutoff(geometry: &RoomGeometry, reference_max_dim: Option<f64>) -> f64 {
    let reference = reference_max_dim
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(REFERENCE_MAX_DIMENSION);
    let ratio = (geometry.largest_dimension() / reference).clamp(0.0, 1.0);
    AIR_CUTOFF_MIN_HZ + AIR_CUTOFF_SPAN_HZ * (1.0 - ratio)
}

impl ToneParameters {
    pub fn for_room(geometry: &RoomGeometry, reference_max_dim: Option<f64>) -> Self {
        let fundamental_hz = fundamental(geometry);
        Self {
            fundamental_hz,
            binaural_delta_hz: binaural_delta(fundamental_hz),
            isochronic_rate_hz: isochronic_rate(geometry),
            air_cutoff_hz: air_cutoff(geometry, reference_max_dim),
        }
    }
}

/// One-pole low-pass filter, in place.
fn low_pass(signal: &mut [f64], cutoff_hz: f64, sample_rate: f64) {
    let a = 1.0 - (-2.0 * PI * cutoff_hz / sample_rate).exp();
    let mut y = 0.0;
    for s in signal.iter_mut() {
        y += a * (*s - y);
        *s = y;
    }
}

/// Isochronic amplitude envelope `0.5·(1 + sin(2π·rate·t))`.
fn pulse_envelope(rate_hz: f64, t: f64) -> f64 {
    0.5 * (1.0 + (2.0 * PI * rate_hz * t).sin())
}

/// Render the stereo tone and place it in the room by convolving each
/// channel with `ir`. Output length is `num_samples`.
pub fn synthesize<R: Rng + ?Sized>(
    params: &ToneParameters,
    ir: &ImpulseResponse,
    num_samples: usize,
    pulse: bool,
    rng: &mut R,
) -> Result<ToneSignal> {
    let fs = ir.sample_rate as f64;
    let left_hz = params.fundamental_hz;
    let right_hz = params.fundamental_hz + params.binaural_delta_hz;

    let mut air = white_noise(rng, num_samples);
    low_pass(&mut air, params.air_cutoff_hz, fs);

    let mut left = Vec::with_capacity(num_samples);
    let mut right = Vec::with_capacity(num_samples);
    for (i, noise) in air.iter().enumerate() {
        let t = i as f64 / fs;
        let gain = if pulse {
            pulse_envelope(params.isochronic_rate_hz, t)
        } else {
            1.0
        };
        let floor = AIR_NOISE_AMPLITUDE * noise;
        left.push(gain * (2.0 * PI * left_hz * t).sin() + floor);
        right.push(gain * (2.0 * PI * right_hz * t).sin() + floor);
    }

    let left = place_in_room(left, &ir.samples, num_samples)?;
    let right = place_in_room(right, &ir.samples, num_samples)?;

    debug!(
        fundamental_hz = left_hz,
        delta_hz = params.binaural_delta_hz,
        rate_hz = params.isochronic_rate_hz,
        cutoff_hz = params.air_cutoff_hz,
        pulse,
        "synthesized tone"
    );

    Ok(ToneSignal {
        left,
        right,
        sample_rate: ir.sample_rate,
    })
}

fn place_in_room(mut channel: Vec<f64>, ir: &[f64], num_samples: usize) -> Result<Vec<f64>> {
    peak_normalize(&mut channel);
    let mut wet = convolve_truncated(&channel, ir, num_samples)?;
    peak_normalize(&mut wet);
    Ok(wet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;
    use crate::spectrum::peak;

    fn unit_ir(sample_rate: u32) -> ImpulseResponse {
        ImpulseResponse {
            samples: vec![1.0],
            sample_rate,
        }
    }

    #[test]
    fn test_fundamental_clamps() {
        // 171.5 / 10.47 · φ ≈ 26.5 Hz
        let g = RoomGeometry::new(10.47, 5.235, 5.827);
        let f = fundamental(&g);
        assert!((f - 171.5 / 10.47 * GOLDEN_RATIO).abs() < 1e-12);
        // Small room saturates high, huge room saturates low.
        assert_eq!(fundamental(&RoomGeometry::new(2.0, 2.0, 2.0)), 100.0);
        assert_eq!(fundamental(&RoomGeometry::new(229.0, 128.0, 20.0)), 20.0);
    }

    #[test]
    fn test_binaural_delta_clamps() {
        assert_eq!(binaural_delta(1.0), 2.0);
        assert!((binaural_delta(8.0) - 8.0 / GOLDEN_RATIO).abs() < 1e-12);
        assert_eq!(binaural_delta(100.0), 8.0);
    }

    #[test]
    fn test_isochronic_rate_uses_second_largest_dimension() {
        let g = RoomGeometry::new(46.68, 2.09, 8.68);
        // 171.5 / 8.68 ≈ 19.8 → clamped to 10
        assert_eq!(isochronic_rate(&g), 10.0);
        let g = RoomGeometry::new(100.0, 50.0, 20.0);
        assert!((isochronic_rate(&g) - 171.5 / 50.0).abs() < 1e-12);
        assert_eq!(isochronic_rate(&RoomGeometry::new(229.0, 128.0, 20.0)), 2.0);
    }

    #[test]
    fn test_air_cutoff_scales_with_room_size() {
        let small = RoomGeometry::new(5.0, 4.0, 3.0);
        let large = RoomGeometry::new(200.0, 50.0, 20.0);
        assert!(air_cutoff(&small, None) > air_cutoff(&large, None));
        assert_eq!(air_cutoff(&large, Some(100.0)), 200.0);
        assert_eq!(air_cutoff(&small, Some(-1.0)), air_cutoff(&small, None));
        let expected = 200.0 + 1800.0 * (1.0 - 5.0 / 229.0);
        assert!((air_cutoff(&small, None) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pulse_envelope_range() {
        for i in 0..100 {
            let e = pulse_envelope(4.0, i as f64 / 97.0);
            assert!((0.0..=1.0).contains(&e));
        }
        assert!((pulse_envelope(4.0, 0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_low_pass_attenuates_high_frequencies() {
        let fs = 8000.0;
        let tone = |f: f64| -> Vec<f64> {
            (0..8000).map(|i| (2.0 * PI * f * i as f64 / fs).sin()).collect()
        };
        let mut low = tone(50.0);
        let mut high = tone(3000.0);
        low_pass(&mut low, 200.0, fs);
        low_pass(&mut high, 200.0, fs);
        assert!(peak(&high[4000..]) < 0.2 * peak(&low[4000..]));
    }

    #[test]
    fn test_stereo_output_normalised() {
        let g = RoomGeometry::new(10.47, 5.235, 5.827);
        let params = ToneParameters::for_room(&g, None);
        let tone = synthesize(&params, &unit_ir(8000), 8000, true, &mut seeded(1)).unwrap();
        assert_eq!(tone.len(), 8000);
        assert_eq!(tone.right.len(), 8000);
        assert!((peak(&tone.left) - 1.0).abs() < 1e-12);
        assert!((peak(&tone.right) - 1.0).abs() < 1e-12);
        assert_eq!(tone.frames().count(), 8000);
        // Detuned channels differ.
        assert_ne!(tone.left, tone.right);
    }

    #[test]
    fn test_pulse_modulates_amplitude() {
        let g = RoomGeometry::new(20.0, 17.15, 8.0);
        let params = ToneParameters::for_room(&g, None);
        assert!((params.isochronic_rate_hz - 10.0).abs() < 1e-9);
        let fs = 8000;
        let rms = |x: &[f64]| (x.iter().map(|s| s * s).sum::<f64>() / x.len() as f64).sqrt();
        let pulsed = synthesize(&params, &unit_ir(fs), 8000, true, &mut seeded(2)).unwrap();
        let steady = synthesize(&params, &unit_ir(fs), 8000, false, &mut seeded(2)).unwrap();
        // The 10 Hz envelope bottoms out at t = 75 ms.
        let trough = rms(&pulsed.left[560..640]);
        let reference = rms(&steady.left[560..640]);
        assert!(trough < 0.3 * reference, "trough {trough}, steady {reference}");
    }

    #[test]
    fn test_seeded_tone_is_bit_identical() {
        let g = RoomGeometry::new(30.0, 10.0, 10.0);
        let params = ToneParameters::for_room(&g, Some(229.0));
        let ir = ImpulseResponse {
            samples: vec![1.0, 0.5, 0.25, 0.125],
            sample_rate: 8000,
        };
        let a = synthesize(&params, &ir, 4000, true, &mut seeded(11)).unwrap();
        let b = synthesize(&params, &ir, 4000, true, &mut seeded(11)).unwrap();
        assert_eq!(a, b);
    }
}
