use chrono::Utc;
use clap::Parser;
use log::{LevelFilter, error, info};
use p3d_convert::{Container, DecodeError, DecodeOptions, obj};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

const MODEL_OUTPUT: &str = "output.obj";
const WORLD_OUTPUT: &str = "output.json";

/// Converts a Poseidon P3D model to OBJ, or dumps a WVR world as JSON.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// P3D model or WVR world to read
    input: PathBuf,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("failed to open {}: {source}", path.display())]
    Input { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Output { path: &'static str, source: io::Error },

    #[error("failed to decode: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to render world: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render model: {0}")]
    Render(#[from] io::Error),
}

fn convert(cli: &Cli) -> Result<(), CliError> {
    let start = Utc::now();

    let file = File::open(&cli.input).map_err(|source| CliError::Input {
        path: cli.input.clone(),
        source,
    })?;
    let container = p3d_convert::decode(BufReader::new(file), &DecodeOptions::default())?;

    // nothing touches the disk until the whole container decoded and rendered
    let (path, bytes) = match &container {
        Container::Model(model) => {
            info!(
                "{:?} model: {} points, {} normals, {} faces{}",
                model.kind(),
                model.points.len(),
                model.normals.len(),
                model.faces.len(),
                if model.supplement.is_some() { ", with supplement" } else { "" }
            );
            (MODEL_OUTPUT, obj::model_to_obj_bytes(model)?)
        }
        Container::World(world) => {
            let subnets: usize = world.nets.iter().map(|net| net.subnets.len()).sum();
            info!(
                "world: {} objects, {} nets, {} subnets",
                world.objects.len(),
                world.nets.len(),
                subnets
            );
            (WORLD_OUTPUT, serde_json::to_vec_pretty(world)?)
        }
    };
    fs::write(path, bytes).map_err(|source| CliError::Output { path, source })?;

    let elapsed = Utc::now().signed_duration_since(start);
    info!("wrote {path} in {} ms", elapsed.num_milliseconds());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version land here too and aren't failures
            return if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    match convert(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
