/// Speed of sound in air (m/s) used throughout the shoebox model.
pub const SPEED_OF_SOUND: f64 = 343.0;

/// Golden ratio φ, used as a resonance-emphasis and tuning constant.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Sabine's constant (s/m) in `RT60 = 0.161·V / (α·S)`.
pub const SABINE_CONSTANT: f64 = 0.161;

/// Octave-band centre frequencies used when the caller supplies none.
pub const DEFAULT_BANDS: [u32; 6] = [125, 250, 500, 1000, 2000, 4000];

/// Substitute geometry (metres) for missing or non-physical dimensions.
pub const DEFAULT_DIMENSIONS: [f64; 3] = [10.0, 10.0, 10.0];

/// Absorption returned when Sabine's equation cannot be inverted.
pub const DEFAULT_ABSORPTION: f64 = 0.2;
pub const MIN_ABSORPTION: f64 = 0.02;
pub const MAX_ABSORPTION: f64 = 0.9;

/// Lower bound for any per-band or synthesis RT60 (s).
pub const RT60_FLOOR: f64 = 0.2;

/// `ln(1000)`: amplitude decays 1000:1 (−60 dB) after one RT60.
pub const DECAY_LN_RATIO: f64 = 6.907_755_278_982_137;

/// `ln(10⁶)`, numerator of the half-power bandwidth `B = ln(10⁶) / (π·T)`.
pub const BANDWIDTH_LN_RATIO: f64 = 13.815_510_558;

/// Highest modal index enumerated along each axis.
pub const MAX_MODE_INDEX: u32 = 11;

pub const DEFAULT_FMAX_HZ: f64 = 2000.0;
pub const DEFAULT_TOP_N: usize = 24;
/// Upper bound on the number of modes a caller may request.
pub const MAX_TOP_N: usize = 200;

/// Number of canonical early-reflection paths.
pub const REFLECTION_TAP_COUNT: usize = 6;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const MIN_SAMPLE_RATE: u32 = 8_000;
pub const MAX_SAMPLE_RATE: u32 = 192_000;
pub const DEFAULT_IR_LENGTH_SEC: f64 = 1.0;
pub const MAX_IR_LENGTH_SEC: f64 = 5.0;

/// Number of lowest modes whose spectral bins are emphasised in the IR.
pub const MODAL_EMPHASIS_COUNT: usize = 6;
/// Gain applied to the bins nearest `mode·φ` and `mode·φ²`.
pub const HARMONIC_BOOST: f64 = 1.25;
/// Random amplitude range of the non-direct early-reflection impulses.
pub const REFLECTION_AMPLITUDE_RANGE: (f64, f64) = (0.2, 0.8);

/// Largest dimension (m) across the bundled site catalog, used to scale the
/// air-noise cutoff when no catalog is supplied.
pub const REFERENCE_MAX_DIMENSION: f64 = 229.0;
pub const AIR_NOISE_AMPLITUDE: f64 = 0.05;
pub const AIR_CUTOFF_MIN_HZ: f64 = 200.0;
pub const AIR_CUTOFF_SPAN_HZ: f64 = 1800.0;

/// Gaussian σ equivalent of a half-power bandwidth (FWHM = 2.355·σ).
pub const FWHM_TO_SIGMA: f64 = 2.355;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_constant_is_ln_1000() {
        assert!((DECAY_LN_RATIO - 1000f64.ln()).abs() < 1e-12);
        assert!((BANDWIDTH_LN_RATIO - 1e6f64.ln()).abs() < 1e-8);
    }

    #[test]
    fn test_golden_ratio() {
        let phi = (1.0 + 5f64.sqrt()) / 2.0;
        assert!((GOLDEN_RATIO - phi).abs() < 1e-15);
    }
}
