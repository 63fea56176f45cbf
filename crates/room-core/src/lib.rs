pub mod bands;
pub mod constants;
pub mod convolution;
pub mod error;
pub mod geometry;
pub mod impulse_response;
pub mod modes;
pub mod physical;
pub mod reflections;
pub mod rng;
pub mod spectrum;
pub mod tone;

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use error::{Result, RoomError};
pub use geometry::RoomGeometry;
pub use impulse_response::ImpulseResponse;
pub use modes::{Mode, ModeKind};
pub use reflections::ReflectionTap;
pub use tone::{ToneParameters, ToneSignal};

use bands::ReverberationProfile;
use constants::{
    DEFAULT_BANDS, DEFAULT_FMAX_HZ, DEFAULT_IR_LENGTH_SEC, DEFAULT_SAMPLE_RATE, DEFAULT_TOP_N,
    MAX_IR_LENGTH_SEC, MAX_SAMPLE_RATE, MAX_TOP_N, MIN_SAMPLE_RATE, REFLECTION_TAP_COUNT,
};

/// Label reported with every fingerprint.
pub const FINGERPRINT_METHOD: &str = "simulation_only_shoebox_analytics";

// ---------------------------------------------------------------------------
// Shared interface types
// ---------------------------------------------------------------------------

/// Everything the pipeline needs to analyse or render one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAcousticRequest {
    /// Room length, width and height in metres.
    pub dims: [f64; 3],
    /// Broadband reverberation time in seconds.
    pub rt60_base: f64,
    /// Band centre frequencies (Hz) for the per-band RT60 breakdown.
    #[serde(default = "default_bands")]
    pub bands: Vec<u32>,
    /// Highest modal frequency reported.
    #[serde(default = "default_fmax_hz")]
    pub fmax_hz: f64,
    /// Number of modes kept in the modal summary.
    #[serde(default = "default_top_n")]
    pub modes_top_n: usize,
    /// Length of the synthesized IR and tone.
    #[serde(default = "default_ir_length_sec")]
    pub ir_length_sec: f64,
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,
    /// Apply the isochronic pulse to the tone.
    #[serde(default = "default_pulse")]
    pub pulse: bool,
}

fn default_bands() -> Vec<u32> {
    DEFAULT_BANDS.to_vec()
}

fn default_fmax_hz() -> f64 {
    DEFAULT_FMAX_HZ
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_ir_length_sec() -> f64 {
    DEFAULT_IR_LENGTH_SEC
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_pulse() -> bool {
    true
}

impl Default for RoomAcousticRequest {
    fn default() -> Self {
        Self {
            dims: constants::DEFAULT_DIMENSIONS,
            rt60_base: 2.0,
            bands: default_bands(),
            fmax_hz: default_fmax_hz(),
            modes_top_n: default_top_n(),
            ir_length_sec: default_ir_length_sec(),
            sample_rate_hz: default_sample_rate(),
            pulse: default_pulse(),
        }
    }
}

impl RoomAcousticRequest {
    pub fn new(dims: [f64; 3], rt60_base: f64) -> Self {
        Self {
            dims,
            rt60_base,
            ..Self::default()
        }
    }

    /// Reject malformed configuration. Geometry and RT60 are never rejected;
    /// they are repaired downstream.
    pub fn validate(&self) -> Result<()> {
        if self.bands.is_empty() {
            return Err(RoomError::EmptyBands);
        }
        if let Some(&band) = self.bands.iter().find(|&&b| b == 0) {
            return Err(RoomError::InvalidBand { band });
        }
        if !self.fmax_hz.is_finite() || self.fmax_hz <= 0.0 {
            return Err(RoomError::InvalidMaxFrequency {
                fmax_hz: self.fmax_hz,
            });
        }
        if self.modes_top_n == 0 || self.modes_top_n > MAX_TOP_N {
            return Err(RoomError::InvalidModeCount {
                top_n: self.modes_top_n,
                max: MAX_TOP_N,
            });
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate_hz) {
            return Err(RoomError::InvalidSampleRate {
                sample_rate_hz: self.sample_rate_hz,
                min: MIN_SAMPLE_RATE,
                max: MAX_SAMPLE_RATE,
            });
        }
        let len_ok = self.ir_length_sec.is_finite()
            && self.ir_length_sec > 0.0
            && self.ir_length_sec <= MAX_IR_LENGTH_SEC
            && self.num_samples() > 0;
        if !len_ok {
            return Err(RoomError::InvalidIrLength {
                seconds: self.ir_length_sec,
                max: MAX_IR_LENGTH_SEC,
            });
        }
        Ok(())
    }

    pub fn geometry(&self) -> RoomGeometry {
        RoomGeometry::from_slice(&self.dims)
    }

    /// `round(fs·length_sec)`; zero for unusable lengths.
    pub fn num_samples(&self) -> usize {
        let n = (self.sample_rate_hz as f64 * self.ir_length_sec).round();
        if n.is_finite() && n > 0.0 {
            n as usize
        } else {
            0
        }
    }

    /// Broadband RT60 as the analysis sees it. Non-finite input is treated
    /// like a non-positive one and takes the degenerate fallbacks.
    pub fn effective_rt60(&self) -> f64 {
        if self.rt60_base.is_finite() {
            self.rt60_base
        } else {
            warn!(rt60 = self.rt60_base, "non-finite RT60, treating as degenerate");
            0.0
        }
    }
}

/// Analytic summary of a room's acoustics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomAcousticFingerprint {
    pub dims_m: [f64; 3],
    pub volume_m3: f64,
    pub surface_area_m2: f64,
    pub absorption_avg: f64,
    pub rt60_s_by_band: BTreeMap<String, f64>,
    /// `None` when no crossover frequency is defined.
    pub schroeder_freq_hz: Option<f64>,
    pub modal_summary: Vec<Mode>,
    pub early_reflection_taps: Vec<ReflectionTap>,
    /// RT60 clamped to `[1, 3]` s; informational only.
    pub ir_tail_sec_reference: f64,
    pub method: &'static str,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Derived quantities shared by the fingerprint and synthesis branches.
struct Analysis {
    geometry: RoomGeometry,
    rt60: f64,
    profile: ReverberationProfile,
    volume: f64,
    surface: f64,
    absorption: f64,
    modes: Vec<Mode>,
}

fn analyze(request: &RoomAcousticRequest) -> Result<Analysis> {
    request.validate()?;
    let geometry = request.geometry();
    let rt60 = request.effective_rt60();
    let profile = ReverberationProfile::from_bands(rt60, &request.bands);
    let volume = physical::volume(&geometry);
    let surface = physical::surface(&geometry);
    let absorption = physical::absorption(rt60, volume, surface);
    let modes = modes::analyze(&geometry, request.fmax_hz, request.modes_top_n, &profile);
    Ok(Analysis {
        geometry,
        rt60,
        profile,
        volume,
        surface,
        absorption,
        modes,
    })
}

/// Compute the analytic fingerprint for a room.
pub fn compute_fingerprint(request: &RoomAcousticRequest) -> Result<RoomAcousticFingerprint> {
    let analysis = analyze(request)?;
    let taps = reflections::early_reflections(
        &analysis.geometry,
        analysis.absorption,
        REFLECTION_TAP_COUNT,
    );

    debug!(
        volume = analysis.volume,
        surface = analysis.surface,
        absorption = analysis.absorption,
        modes = analysis.modes.len(),
        "computed room fingerprint"
    );

    Ok(RoomAcousticFingerprint {
        dims_m: analysis.geometry.as_array(),
        volume_m3: analysis.volume,
        surface_area_m2: analysis.surface,
        absorption_avg: analysis.absorption,
        rt60_s_by_band: analysis.profile.to_map(),
        schroeder_freq_hz: physical::schroeder_frequency(analysis.rt60, analysis.volume),
        modal_summary: analysis.modes,
        early_reflection_taps: taps,
        ir_tail_sec_reference: physical::ir_tail_reference(analysis.rt60),
        method: FINGERPRINT_METHOD,
    })
}

/// Synthesize the room impulse response. `rng` supplies all noise.
pub fn synthesize_ir<R: Rng + ?Sized>(
    request: &RoomAcousticRequest,
    rng: &mut R,
) -> Result<ImpulseResponse> {
    let analysis = analyze(request)?;
    render_ir(request, &analysis, rng)
}

fn render_ir<R: Rng + ?Sized>(
    request: &RoomAcousticRequest,
    analysis: &Analysis,
    rng: &mut R,
) -> Result<ImpulseResponse> {
    let inputs = impulse_response::IrInputs {
        geometry: analysis.geometry,
        rt60: analysis.rt60,
        absorption: analysis.absorption,
        modes: &analysis.modes,
        sample_rate: request.sample_rate_hz,
        num_samples: request.num_samples(),
    };
    impulse_response::synthesize(&inputs, rng)
}

/// Synthesize the room's stereo tone: a fresh IR is drawn from `rng` first,
/// then the tone's noise floor.
///
/// `reference_max_dim` is the largest dimension across the site catalog, if
/// one is available.
pub fn synthesize_tone<R: Rng + ?Sized>(
    request: &RoomAcousticRequest,
    reference_max_dim: Option<f64>,
    rng: &mut R,
) -> Result<ToneSignal> {
    let analysis = analyze(request)?;
    let ir = render_ir(request, &analysis, rng)?;
    let params = ToneParameters::for_room(&analysis.geometry, reference_max_dim);
    tone::synthesize(&params, &ir, request.num_samples(), request.pulse, rng)
}
