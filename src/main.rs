//! # CotW Dungeon Generator Entry Point
//!
//! Generates one dungeon level and prints it as ASCII or writes it as JSON.

use clap::{Parser, ValueEnum};
use cotw::{CotwError, CotwResult, GenerationConfig, Generator, RoomCorridorGenerator};
use log::{error, info, warn};

/// Output formats for the generated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// The layout rows only
    Ascii,
    /// The full LevelData record
    Json,
}

/// Command line arguments for the level generator.
#[derive(Parser, Debug)]
#[command(name = "cotw")]
#[command(about = "Generate a Castles of the Wind style dungeon level")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level width in tiles
    #[arg(long)]
    width: Option<u32>,

    /// Level height in tiles
    #[arg(long)]
    height: Option<u32>,

    /// JSON file with generation settings
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "ascii")]
    format: OutputFormat,

    /// Write the level JSON to this file instead of printing
    #[arg(short, long)]
    output: Option<std::path::PathBuf>,

    /// Check structural invariants of the generated level
    #[arg(long)]
    validate: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> CotwResult<()> {
    let args = Args::parse();

    // Initialize logging
    initialize_logging(&args.log_level);

    info!("Starting CotW dungeon generator v{}", cotw::VERSION);

    let config = build_config(&args)?;
    let generator = RoomCorridorGenerator::new();
    let mut rng = cotw::create_rng(&config);

    info!("Generating dungeon level with seed: {}", config.seed);
    let generated = generator.generate(&config, &mut rng);

    if args.validate {
        if let Err(e) = generator.validate(&generated, &config) {
            error!("Level failed validation: {}", e);
            return Err(e);
        }
        info!("Level passed validation");
    }

    if let Some(path) = &args.output {
        generated.level.save(path)?;
        info!("Level written to {}", path.display());
        return Ok(());
    }

    match args.format {
        OutputFormat::Ascii => {
            for row in &generated.level.layout {
                println!("{}", row);
            }
        }
        OutputFormat::Json => println!("{}", generated.level.to_json()?),
    }

    Ok(())
}

/// Initializes the logging system; `RUST_LOG` overrides the command line level.
fn initialize_logging(log_level: &str) {
    let env = env_logger::Env::default().default_filter_or(log_level);
    if env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init()
        .is_err()
    {
        warn!("Logger already initialized");
    }
}

/// Merges the optional config file with command line overrides.
fn build_config(args: &Args) -> CotwResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::new(rand::random()),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }

    if config.tile_size == 0 {
        return Err(CotwError::InvalidConfig(
            "tile_size must be at least 1".to_string(),
        ));
    }

    Ok(config)
}
