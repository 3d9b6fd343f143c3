use anyhow::Result;
use clap::Parser;
use fruitcam::{FruitcamApp, FruitcamConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "fruitcam")]
#[command(about = "Capture a webcam frame and hear what fruit it shows")]
#[command(version)]
#[command(long_about = "Opens a local camera, captures a single frame on request, sends it \
to a /predict inference server as a JPEG data URI and speaks the returned label.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "fruitcam.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Override the inference endpoint
    #[arg(long, value_name = "URL", help = "Inference endpoint, e.g. http://127.0.0.1:5000/predict")]
    endpoint: Option<String>,

    /// Use a synthetic camera instead of a real device
    #[arg(long, help = "Use a generated test image instead of a real camera")]
    mock_camera: bool,

    /// Log narration instead of speaking it
    #[arg(long, help = "Disable speech output")]
    mute: bool,

    /// Capture one frame, print the label and exit
    #[arg(long, help = "Open the camera, classify one frame, print the label and exit")]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting Fruitcam v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let mut config = match FruitcamConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    apply_overrides(&mut config, &args);

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let app = FruitcamApp::new(&config, args.mock_camera).map_err(|e| {
        error!("Failed to initialize: {}", e);
        e
    })?;

    let exit_code = if args.once {
        if app.run_once().await {
            0
        } else {
            1
        }
    } else {
        app.run_interactive().await.map_err(|e| {
            error!("Error during execution: {}", e);
            e
        })?
    };

    info!("Fruitcam exited with code: {}", exit_code);

    // Exit without dropping the narrator so the last utterance plays out
    std::process::exit(exit_code);
}

fn apply_overrides(config: &mut FruitcamConfig, args: &Args) {
    if let Some(endpoint) = &args.endpoint {
        config.inference.endpoint = endpoint.clone();
    }
    if args.mute {
        config.narrator.enabled = false;
    }
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fruitcam={}", log_level)));

    // stdout belongs to the status line
    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("pretty") => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some("compact") | None => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# Fruitcam Configuration File");
    println!("# Every key can also be set through FRUITCAM_<SECTION>__<KEY>");
    println!();
    print!("{}", toml::to_string_pretty(&FruitcamConfig::default())?);
    Ok(())
}
