//! Canopy scene generation utility
//!
//! Builds a discrete canopy from a JSON scene description and writes the
//! corresponding kernel scene dictionary as JSON.
//!
//! Usage:
//!     generate_canopy [OPTIONS] <SCENE_JSON>
//!
//! Options:
//!     -o, --output <FILE>     Output file (default: stdout)
//!     -p, --padding <N>       Override the canopy padding
//!     --compact               Write compact instead of pretty-printed JSON
//!     -h, --help              Show this help message
//!
//! Scene description format:
//!     {
//!         "units": {"length": "m"},
//!         "context": {"ref": true, "kernel_length": "m"},
//!         "canopy": {"construct": "homogeneous", "lai": 3.0, ...}
//!     }

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;

use canopygen::biosphere::{DiscreteCanopy, Dict};
use canopygen::core::{logging, KernelDictContext, UnitConfig};

fn print_help() {
    eprintln!("generate_canopy - Discrete canopy scene generation utility");
    eprintln!();
    eprintln!("Usage: generate_canopy [OPTIONS] <SCENE_JSON>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -o, --output <FILE>     Output file (default: stdout)");
    eprintln!("    -p, --padding <N>       Override the canopy padding");
    eprintln!("    --compact               Write compact instead of pretty-printed JSON");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    generate_canopy -o canopy_kernel.json scene.json");
    eprintln!("    generate_canopy --padding 2 scene.json");
}

#[derive(Debug)]
struct Args {
    scene: PathBuf,
    output: Option<PathBuf>,
    padding: Option<i64>,
    compact: bool,
}

/// Top-level layout of a scene description file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneDescription {
    #[serde(default)]
    units: UnitConfig,
    #[serde(default)]
    context: KernelDictContext,
    canopy: Dict,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return Err("Missing scene description".to_string());
    }

    let mut scene: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut padding: Option<i64> = None;
    let mut compact = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --output".to_string());
                }
                output = Some(PathBuf::from(&args[i]));
            }
            "-p" | "--padding" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --padding".to_string());
                }
                padding = Some(
                    args[i]
                        .parse()
                        .map_err(|_| format!("Invalid padding: {}", args[i]))?,
                );
            }
            "--compact" => compact = true,
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => {
                if scene.is_some() {
                    return Err("Multiple scene descriptions specified".to_string());
                }
                scene = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    let scene = scene.ok_or("Missing scene description")?;

    Ok(Args {
        scene,
        output,
        padding,
        compact,
    })
}

fn run(args: &Args) -> canopygen::core::Result<()> {
    let text = fs::read_to_string(&args.scene)?;
    let mut description: SceneDescription = serde_json::from_str(&text)?;

    if let Some(padding) = args.padding {
        description
            .canopy
            .insert("padding".to_string(), Value::from(padding));
    }

    let start = Instant::now();
    let canopy = DiscreteCanopy::from_dict(description.canopy, &description.units)?;
    let unit = description.units.length;
    let size = canopy.size().to_array().map(|v| unit.from_meters(v));
    let n_instances: usize = canopy
        .instanced_canopy_elements()
        .iter()
        .map(|e| e.n_instances())
        .sum();
    log::info!(
        "Built canopy '{}': {} element(s), {} instance(s), size {:?} {} in {:.2}s",
        canopy.id(),
        canopy.instanced_canopy_elements().len(),
        n_instances,
        size,
        unit.symbol(),
        start.elapsed().as_secs_f64()
    );

    let kernel_dict = canopy.kernel_dict(&description.context)?;
    log::info!("Kernel dictionary holds {} entries", kernel_dict.len());

    let json = if args.compact {
        serde_json::to_string(&kernel_dict)?
    } else {
        serde_json::to_string_pretty(&kernel_dict)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
