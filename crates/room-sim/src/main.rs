mod catalog;
mod wav;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use room_core::constants::{
    DEFAULT_BANDS, DEFAULT_FMAX_HZ, DEFAULT_IR_LENGTH_SEC, DEFAULT_SAMPLE_RATE, DEFAULT_TOP_N,
};
use room_core::rng::seeded;
use room_core::RoomAcousticRequest;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use catalog::Catalog;

#[derive(Parser)]
#[command(name = "room-sim", about = "Shoebox room acoustics: fingerprints, impulse responses and tones")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the acoustic fingerprint as JSON.
    Fingerprint {
        #[command(flatten)]
        room: RoomArgs,
    },
    /// Write the synthetic impulse response to a mono WAV file.
    Ir {
        #[command(flatten)]
        room: RoomArgs,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write the binaural/isochronic tone to a stereo WAV file.
    Tone {
        #[command(flatten)]
        room: RoomArgs,
        #[arg(long)]
        out: PathBuf,
        /// Disable the isochronic amplitude pulse.
        #[arg(long)]
        no_pulse: bool,
    },
    /// List catalog sites grouped by region.
    Sites {
        #[arg(long)]
        catalog: PathBuf,
    },
    /// Print one catalog entry, including its notes and sources, as JSON.
    SiteInfo {
        #[arg(long)]
        site: String,
        #[arg(long)]
        catalog: PathBuf,
    },
}

#[derive(Args)]
struct RoomArgs {
    /// Room length, width and height in metres.
    #[arg(long, num_args = 3, value_names = ["L", "W", "H"], conflicts_with = "site")]
    dims: Option<Vec<f64>>,
    /// Broadband RT60 in seconds.
    #[arg(long, conflicts_with = "site")]
    rt60: Option<f64>,
    /// Site name to look up in `--catalog`.
    #[arg(long, requires = "catalog")]
    site: Option<String>,
    /// Tab-separated site catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_BANDS.to_vec())]
    bands: Vec<u32>,
    #[arg(long, default_value_t = DEFAULT_FMAX_HZ)]
    fmax: f64,
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
    /// IR and tone length in seconds.
    #[arg(long, default_value_t = DEFAULT_IR_LENGTH_SEC)]
    length: f64,
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,
    /// Seed for the noise generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

/// A request plus whatever the catalog can tell the tone stage.
struct ResolvedRoom {
    request: RoomAcousticRequest,
    reference_max_dim: Option<f64>,
}

impl RoomArgs {
    fn resolve(&self) -> Result<ResolvedRoom> {
        let catalog = self.catalog.as_ref().map(Catalog::load).transpose()?;
        let reference_max_dim = catalog.as_ref().and_then(Catalog::max_dimension);

        let (dims, rt60) = match (&self.site, &catalog) {
            (Some(name), Some(catalog)) => {
                let site = catalog
                    .get(name)
                    .with_context(|| format!("Site '{name}' not found in catalog"))?;
                info!(site = %site.name, region = %site.region, "resolved catalog site");
                (site.dims, site.rt60)
            }
            _ => {
                let (Some(dims), Some(rt60)) = (&self.dims, self.rt60) else {
                    bail!("either --site with --catalog, or both --dims and --rt60 are required");
                };
                // Missing entries become NaN and are repaired by the core.
                let dim = |i: usize| dims.get(i).copied().unwrap_or(f64::NAN);
                ([dim(0), dim(1), dim(2)], rt60)
            }
        };

        let mut request = RoomAcousticRequest::new(dims, rt60);
        request.bands = self.bands.clone();
        request.fmax_hz = self.fmax;
        request.modes_top_n = self.top_n;
        request.ir_length_sec = self.length;
        request.sample_rate_hz = self.sample_rate;
        request.validate().context("Invalid request")?;

        Ok(ResolvedRoom {
            request,
            reference_max_dim,
        })
    }
}

fn site_info(catalog: &Catalog, name: &str) -> Result<String> {
    let site = catalog
        .get(name)
        .with_context(|| format!("Site '{name}' not found in catalog"))?;
    Ok(serde_json::to_string_pretty(site)?)
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["room_core=info", "room_sim=info"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Fingerprint { room } => {
            let resolved = room.resolve()?;
            let fingerprint = room_core::compute_fingerprint(&resolved.request)?;
            println!("{}", serde_json::to_string_pretty(&fingerprint)?);
        }
        Commands::Ir { room, out } => {
            let resolved = room.resolve()?;
            let mut rng = seeded(room.seed);
            let ir = room_core::synthesize_ir(&resolved.request, &mut rng)?;
            wav::write_ir(&out, &ir)?;
            info!(path = %out.display(), samples = ir.len(), "wrote impulse response");
        }
        Commands::Tone {
            room,
            out,
            no_pulse,
        } => {
            let mut resolved = room.resolve()?;
            resolved.request.pulse = !no_pulse;
            let mut rng = seeded(room.seed);
            let tone = room_core::synthesize_tone(
                &resolved.request,
                resolved.reference_max_dim,
                &mut rng,
            )?;
            wav::write_tone(&out, &tone)?;
            info!(path = %out.display(), frames = tone.len(), "wrote tone");
        }
        Commands::Sites { catalog } => {
            let catalog = Catalog::load(&catalog)?;
            if catalog.is_empty() {
                warn!("catalog has no sites");
            }
            info!(sites = catalog.len(), "loaded catalog");
            println!("{}", serde_json::to_string_pretty(&catalog.by_region())?);
        }
        Commands::SiteInfo { site, catalog } => {
            let catalog = Catalog::load(&catalog)?;
            println!("{}", site_info(&catalog, &site)?);
        }
    }
    Ok(())
}
