use serde::Serialize;

use crate::constants::{REFLECTION_TAP_COUNT, SPEED_OF_SOUND};
use crate::geometry::RoomGeometry;

/// Guards the `1/d²` spreading term against `d = 0`.
const MIN_PATH_SQUARED: f64 = 1e-6;

/// One early-reflection arrival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReflectionTap {
    pub time_ms: f64,
    pub relative_energy: f64,
}

/// A canonical propagation path: length in metres and wall bounces.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Path {
    length: f64,
    bounces: i32,
}

/// Direct path, the three single-wall round trips, then the two floor-plan
/// and elevation diagonals.
fn canonical_paths(geometry: &RoomGeometry) -> [Path; REFLECTION_TAP_COUNT] {
    let RoomGeometry {
        length: l,
        width: w,
        height: h,
    } = *geometry;
    [
        Path { length: 0.0, bounces: 0 },
        Path { length: 2.0 * l, bounces: 1 },
        Path { length: 2.0 * w, bounces: 1 },
        Path { length: 2.0 * h, bounces: 1 },
        Path { length: 2.0 * (l * l + w * w).sqrt(), bounces: 2 },
        Path { length: 2.0 * (l * l + h * h).sqrt(), bounces: 2 },
    ]
}

fn path_energy(path: &Path, absorption: f64) -> f64 {
    if path.bounces == 0 {
        return 1.0;
    }
    (1.0 - absorption).powi(path.bounces) / (path.length * path.length).max(MIN_PATH_SQUARED)
}

/// First `count` early-reflection taps (clamped to `1..=6`), direct path
/// first, with energies normalised over the returned set.
pub fn early_reflections(geometry: &RoomGeometry, absorption: f64, count: usize) -> Vec<ReflectionTap> {
    let mut taps: Vec<ReflectionTap> = canonical_paths(geometry)
        .iter()
        .map(|path| ReflectionTap {
            time_ms: 1000.0 * path.length / SPEED_OF_SOUND,
            relative_energy: path_energy(path, absorption),
        })
        .collect();
    taps.truncate(count.clamp(1, REFLECTION_TAP_COUNT));

    let total: f64 = taps.iter().map(|t| t.relative_energy).sum();
    let denom = if total > 0.0 { total } else { 1.0 };
    for tap in &mut taps {
        tap.relative_energy /= denom;
    }
    taps
}
