use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use towercal::{
    default_profile_path, format_summary, init_logging, interpolate, load_profile, save_profile,
    submit, suggested_file_name, validate, Field, GenerationRequest, RawParameters, TowerEngine,
};

/// Generate retraction calibration tower G-code.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "towercal")]
struct Cli {
    /// Profile file with saved field values (JSON or TOML)
    #[arg(long, short, env = "TOWERCAL_PROFILE")]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the profile and write the calibration G-code
    Generate {
        /// Output path; defaults to an auto-generated file name in the
        /// current directory
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Override single fields, e.g. --set bed_size_x=235
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        overrides: Vec<String>,
    },

    /// Validate the profile and report the first failure, if any
    Check {
        /// Override single fields, e.g. --set firmware=klipper
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        overrides: Vec<String>,
    },

    /// Write a stock profile to the profile path
    InitProfile {
        /// Overwrite an existing profile file
        #[arg(long)]
        force: bool,
    },
}

/// Load the configured profile, or fall back to stock defaults when no
/// profile file exists yet.
fn load_raw_parameters(profile: &Option<PathBuf>) -> Result<RawParameters> {
    match profile {
        Some(path) => load_profile(path)
            .with_context(|| format!("failed to load profile {}", path.display())),
        None => {
            let path = default_profile_path();
            if path.exists() {
                load_profile(&path)
                    .with_context(|| format!("failed to load profile {}", path.display()))
            } else {
                tracing::info!("no profile found, using stock defaults");
                Ok(RawParameters::default())
            }
        }
    }
}

fn apply_overrides(raw: &mut RawParameters, overrides: &[String]) -> Result<()> {
    for entry in overrides {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("override '{}' is not of the form FIELD=VALUE", entry);
        };
        let field: Field = key
            .trim()
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        raw.set(field, value.trim())
            .with_context(|| format!("invalid override for '{}'", field))?;
    }
    Ok(())
}

async fn cmd_generate(
    profile: &Option<PathBuf>,
    output: Option<PathBuf>,
    overrides: &[String],
) -> Result<()> {
    let mut raw = load_raw_parameters(profile)?;
    apply_overrides(&mut raw, overrides)?;

    let params = validate(&raw)?;
    let segments = interpolate(&params)?;
    let summary = format_summary(&segments);

    let request = GenerationRequest::assemble(params.clone(), segments);
    let gcode = submit(&TowerEngine, &request).await?;

    let output = output.unwrap_or_else(|| PathBuf::from(suggested_file_name(&params)));
    std::fs::write(&output, &gcode)
        .with_context(|| format!("failed to write {}", output.display()))?;

    print!("{}", summary);
    tracing::info!(
        path = %output.display(),
        bytes = gcode.len(),
        "calibration G-code written"
    );
    Ok(())
}

fn cmd_check(profile: &Option<PathBuf>, overrides: &[String]) -> Result<()> {
    let mut raw = load_raw_parameters(profile)?;
    apply_overrides(&mut raw, overrides)?;

    match validate(&raw) {
        Ok(params) => {
            println!(
                "OK: {} segments of {}mm, firmware {}",
                params.num_segments,
                towercal::format_value(params.segment_height, 2),
                params.firmware
            );
            Ok(())
        }
        Err(err) => bail!("{} (field: {})", err, err.field()),
    }
}

fn cmd_init_profile(profile: &Option<PathBuf>, force: bool) -> Result<()> {
    let path = profile.clone().unwrap_or_else(default_profile_path);
    if path.exists() && !force {
        bail!(
            "profile {} already exists, pass --force to overwrite",
            path.display()
        );
    }
    save_profile(&RawParameters::default(), &path)?;
    println!("wrote {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    match &cli.command {
        Commands::Generate { output, overrides } => {
            cmd_generate(&cli.profile, output.clone(), overrides).await
        }
        Commands::Check { overrides } => cmd_check(&cli.profile, overrides),
        Commands::InitProfile { force } => cmd_init_profile(&cli.profile, *force),
    }
}
