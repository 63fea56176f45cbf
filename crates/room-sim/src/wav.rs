use std::path::Path;

use anyhow::{Context, Result};
use room_core::{ImpulseResponse, ToneSignal};

fn float_spec(channels: u16, sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// Writes an impulse response as a mono 32-bit float WAV file.
pub fn write_ir<P: AsRef<Path>>(path: P, ir: &ImpulseResponse) -> Result<()> {
    let mut writer = hound::WavWriter::create(path.as_ref(), float_spec(1, ir.sample_rate))
        .context("Failed to create WAV file")?;
    for &s in &ir.samples {
        writer
            .write_sample(s as f32)
            .context("Failed to write sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

/// Writes a stereo tone as an interleaved 32-bit float WAV file.
pub fn write_tone<P: AsRef<Path>>(path: P, tone: &ToneSignal) -> Result<()> {
    let mut writer = hound::WavWriter::create(path.as_ref(), float_spec(2, tone.sample_rate))
        .context("Failed to create WAV file")?;
    for (l, r) in tone.frames() {
        writer
            .write_sample(l as f32)
            .context("Failed to write sample")?;
        writer
            .write_sample(r as f32)
            .context("Failed to write sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}
