use crate::constants::{DEFAULT_ABSORPTION, MAX_ABSORPTION, MIN_ABSORPTION, SABINE_CONSTANT};
use crate::geometry::RoomGeometry;

/// RT60 values that carry information: finite and positive. Everything else
/// takes the degenerate-RT60 fallbacks.
pub fn is_usable_rt60(rt60: f64) -> bool {
    rt60.is_finite() && rt60 > 0.0
}

/// Room volume in m³.
pub fn volume(geometry: &RoomGeometry) -> f64 {
    geometry.volume()
}

/// Total interior surface area in m².
pub fn surface(geometry: &RoomGeometry) -> f64 {
    geometry.surface_area()
}

/// Average surface absorption from Sabine's equation, inverted:
///
/// α = 0.161·V / (RT60·S), clamped to `[0.02, 0.9]`.
///
/// Falls back to 0.2 when `rt60` is degenerate or `surface ≤ 0`.
pub fn absorption(rt60: f64, volume: f64, surface: f64) -> f64 {
    if !is_usable_rt60(rt60) || !(surface > 0.0) {
        return DEFAULT_ABSORPTION;
    }
    let alpha = SABINE_CONSTANT * volume / (rt60 * surface);
    if !alpha.is_finite() {
        return DEFAULT_ABSORPTION;
    }
    alpha.clamp(MIN_ABSORPTION, MAX_ABSORPTION)
}

/// Schroeder crossover frequency `2000·sqrt(RT60 / V)` in Hz.
///
/// `None` means no crossover is defined (non-positive volume, degenerate
/// RT60, or a result that does not fit in an `f64`).
pub fn schroeder_frequency(rt60: f64, volume: f64) -> Option<f64> {
    if !(volume > 0.0) || !is_usable_rt60(rt60) {
        return None;
    }
    Some(2000.0 * (rt60 / volume).sqrt()).filter(|f| f.is_finite())
}

/// Reference tail length reported next to the fingerprint: RT60 clamped to
/// `[1, 3]` seconds.
pub fn ir_tail_reference(rt60: f64) -> f64 {
    if !rt60.is_finite() {
        return 1.0;
    }
    rt60.clamp(1.0, 3.0)
}
