use serde::Serialize;
use std::f64::consts::PI;

use crate::bands::ReverberationProfile;
use crate::constants::{
    BANDWIDTH_LN_RATIO, FWHM_TO_SIGMA, MAX_MODE_INDEX, MAX_TOP_N, SPEED_OF_SOUND,
};
use crate::geometry::RoomGeometry;

/// Modes below this frequency are weighted as if they sat at it.
const ENERGY_FREQ_FLOOR_HZ: f64 = 50.0;

/// Mode class by the number of nonzero indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Axial,
    Tangential,
    Oblique,
}

impl ModeKind {
    /// `None` for the (0,0,0) triple, which is not a mode.
    pub fn classify(nx: u32, ny: u32, nz: u32) -> Option<Self> {
        let nonzero = [nx, ny, nz].iter().filter(|&&n| n > 0).count();
        match nonzero {
            1 => Some(ModeKind::Axial),
            2 => Some(ModeKind::Tangential),
            3 => Some(ModeKind::Oblique),
            _ => None,
        }
    }
}

/// A rigid-wall room resonance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mode {
    #[serde(rename = "freq_hz")]
    pub frequency_hz: f64,
    pub nx: u32,
    pub ny: u32,
    pub nz: u32,
    #[serde(rename = "type")]
    pub kind: ModeKind,
    pub bandwidth_hz: f64,
    pub gauss_sigma_hz: f64,
    #[serde(rename = "rel_energy")]
    pub relative_energy: f64,
}

/// Eigenfrequency of mode `(nx, ny, nz)`:
/// `f = (c/2)·sqrt((nx/Lx)² + (ny/Ly)² + (nz/Lz)²)`.
pub fn eigenfrequency(geometry: &RoomGeometry, nx: u32, ny: u32, nz: u32) -> f64 {
    let kx = nx as f64 / geometry.length;
    let ky = ny as f64 / geometry.width;
    let kz = nz as f64 / geometry.height;
    (SPEED_OF_SOUND / 2.0) * (kx * kx + ky * ky + kz * kz).sqrt()
}

/// Half-power bandwidth (Hz) of a mode decaying with `rt60`:
/// `B = ln(10⁶) / (π·T)`.
pub fn bandwidth(rt60: f64) -> f64 {
    BANDWIDTH_LN_RATIO / (PI * rt60.max(1e-6))
}

/// Unnormalised energy weight favouring low, narrow (long-lived) modes.
fn energy_weight(bandwidth_hz: f64, frequency_hz: f64) -> f64 {
    1.0 / (bandwidth_hz.max(1e-6) * frequency_hz.max(ENERGY_FREQ_FLOOR_HZ))
}

/// Enumerate every mode up to `fmax_hz` with index range `0..=11` per axis,
/// unsorted and with unnormalised energies.
pub fn enumerate(
    geometry: &RoomGeometry,
    fmax_hz: f64,
    profile: &ReverberationProfile,
) -> Vec<Mode> {
    let mut modes = Vec::new();
    for nx in 0..=MAX_MODE_INDEX {
        for ny in 0..=MAX_MODE_INDEX {
            for nz in 0..=MAX_MODE_INDEX {
                let Some(kind) = ModeKind::classify(nx, ny, nz) else {
                    continue;
                };
                let f = eigenfrequency(geometry, nx, ny, nz);
                if f > fmax_hz {
                    continue;
                }
                let b = bandwidth(profile.rt60_near(f));
                modes.push(Mode {
                    frequency_hz: f,
                    nx,
                    ny,
                    nz,
                    kind,
                    bandwidth_hz: b,
                    gauss_sigma_hz: b / FWHM_TO_SIGMA,
                    relative_energy: energy_weight(b, f),
                });
            }
        }
    }
    modes
}

/// The `top_n` lowest modes up to `fmax_hz`, ascending in frequency (higher
/// energy first among equal frequencies), energies renormalised to sum to 1.
///
/// `top_n` is clamped to `1..=200`.
pub fn analyze(
    geometry: &RoomGeometry,
    fmax_hz: f64,
    top_n: usize,
    profile: &ReverberationProfile,
) -> Vec<Mode> {
    let mut modes = enumerate(geometry, fmax_hz, profile);
    modes.sort_by(|a, b| {
        a.frequency_hz
            .total_cmp(&b.frequency_hz)
            .then(b.relative_energy.total_cmp(&a.relative_energy))
    });
    modes.truncate(top_n.clamp(1, MAX_TOP_N));

    let sum: f64 = modes.iter().map(|m| m.relative_energy).sum();
    let denom = if sum > 0.0 { sum } else { 1.0 };
    for m in &mut modes {
        m.relative_energy /= denom;
    }
    modes
}
