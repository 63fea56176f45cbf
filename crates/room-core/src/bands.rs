use std::collections::BTreeMap;

use crate::constants::RT60_FLOOR;

/// Spectral tilt in seconds per decade, anchored at 500 Hz.
const TILT_PER_DECADE: f64 = 0.18;
const TILT_ANCHOR_HZ: f64 = 500.0;
/// Bands below this centre frequency get the same tilt as this one.
const TILT_LOW_LIMIT_HZ: f64 = 125.0;

/// RT60 estimate for one band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRt60 {
    pub band_hz: u32,
    pub rt60_s: f64,
}

/// Broadband RT60 plus its per-band breakdown, in caller order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverberationProfile {
    base_rt60: f64,
    bands: Vec<BandRt60>,
}

/// RT60 at centre frequency `band_hz` for a given broadband value.
///
/// Low bands ring slightly longer and high bands shorter; the result is never
/// below 0.2 s. A non-finite `base_rt60` yields the floor.
pub fn band_rt60(base_rt60: f64, band_hz: f64) -> f64 {
    if !base_rt60.is_finite() {
        return RT60_FLOOR;
    }
    let tilt = -TILT_PER_DECADE * (band_hz.max(TILT_LOW_LIMIT_HZ) / TILT_ANCHOR_HZ).log10();
    let rt60 = base_rt60 + tilt;
    if !rt60.is_finite() {
        return RT60_FLOOR;
    }
    rt60.max(RT60_FLOOR)
}

impl ReverberationProfile {
    /// Derive per-band values for each requested centre frequency. Repeated
    /// bands keep their first position.
    pub fn from_bands(base_rt60: f64, bands: &[u32]) -> Self {
        let mut out: Vec<BandRt60> = Vec::with_capacity(bands.len());
        for &band_hz in bands {
            if out.iter().any(|b| b.band_hz == band_hz) {
                continue;
            }
            out.push(BandRt60 {
                band_hz,
                rt60_s: band_rt60(base_rt60, band_hz as f64),
            });
        }
        Self {
            base_rt60,
            bands: out,
        }
    }

    pub fn base_rt60(&self) -> f64 {
        self.base_rt60
    }

    pub fn bands(&self) -> &[BandRt60] {
        &self.bands
    }

    /// The band whose centre is closest to `freq_hz`; the first one wins a tie.
    pub fn nearest_band(&self, freq_hz: f64) -> Option<&BandRt60> {
        let mut best: Option<(&BandRt60, f64)> = None;
        for band in &self.bands {
            let distance = (band.band_hz as f64 - freq_hz).abs();
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((band, distance)),
            }
        }
        best.map(|(band, _)| band)
    }

    /// RT60 to use for a mode at `freq_hz`. An empty profile falls back to
    /// the floored broadband value.
    pub fn rt60_near(&self, freq_hz: f64) -> f64 {
        match self.nearest_band(freq_hz) {
            Some(band) => band.rt60_s,
            None if self.base_rt60.is_finite() => self.base_rt60.max(RT60_FLOOR),
            None => RT60_FLOOR,
        }
    }

    /// Band map keyed by the decimal band frequency, as reported in the
    /// fingerprint.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.bands
            .iter()
            .map(|b| (b.band_hz.to_string(), b.rt60_s))
            .collect()
    }
}
