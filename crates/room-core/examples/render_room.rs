//! CLI walkthrough of the analysis and synthesis pipeline.
//!
//! Analyses the King's Chamber geometry, synthesizes its impulse response and
//! tone with a fixed seed, and prints a short summary of each stage.
//!
//! Run with:
//!   cargo run -p room-core --example render_room

use room_core::rng::seeded;
use room_core::spectrum::peak;
use room_core::{compute_fingerprint, synthesize_ir, synthesize_tone, RoomAcousticRequest};

fn main() -> Result<(), room_core::RoomError> {
    println!("=== Room Pipeline Walkthrough ===");

    // 1. Analytic fingerprint.
    let request = RoomAcousticRequest::new([10.47, 5.235, 5.827], 2.5);
    let fp = compute_fingerprint(&request)?;
    println!(
        "V = {:.1} m³, S = {:.1} m², α = {:.3}",
        fp.volume_m3, fp.surface_area_m2, fp.absorption_avg
    );
    match fp.schroeder_freq_hz {
        Some(f) => println!("Schroeder frequency: {f:.1} Hz"),
        None => println!("Schroeder frequency: undefined"),
    }
    for (band, rt60) in &fp.rt60_s_by_band {
        println!("  RT60 @ {band:>4} Hz: {rt60:.2} s");
    }
    for mode in fp.modal_summary.iter().take(6) {
        println!(
            "  mode ({},{},{}) {:?}: {:.2} Hz, B = {:.2} Hz, E = {:.3}",
            mode.nx, mode.ny, mode.nz, mode.kind, mode.frequency_hz, mode.bandwidth_hz,
            mode.relative_energy
        );
    }
    for tap in &fp.early_reflection_taps {
        println!("  tap {:7.2} ms  energy {:.4}", tap.time_ms, tap.relative_energy);
    }

    // 2. Impulse response.
    let mut rng = seeded(42);
    let ir = synthesize_ir(&request, &mut rng)?;
    println!(
        "IR: {} samples at {} Hz ({:.2} s), peak {:.3}",
        ir.len(),
        ir.sample_rate,
        ir.duration_sec(),
        peak(&ir.samples)
    );

    // 3. Tone.
    let tone = synthesize_tone(&request, None, &mut seeded(42))?;
    println!(
        "Tone: {} stereo frames, peaks L {:.3} / R {:.3}",
        tone.len(),
        peak(&tone.left),
        peak(&tone.right)
    );
    println!("Done.");
    Ok(())
}
