//! Frustum CLI: headless rendering, mesh inspection and pipeline dumps.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use frustum_render::CameraMotion;

mod commands;

#[derive(Parser)]
#[command(name = "frustum")]
#[command(version, about = "Frustum: device-accelerated 3D mesh projection")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render frames headlessly.
    Render {
        /// Mesh to draw (.obj or .json). Defaults to the unit cube.
        #[arg(short, long)]
        mesh: Option<String>,

        /// Renderer config (TOML).
        #[arg(short, long)]
        config: Option<String>,

        /// Frame count, overriding the config.
        #[arg(short, long)]
        frames: Option<u32>,

        /// Write every frame's screen triangles to this JSON file.
        #[arg(short, long)]
        output: Option<String>,

        /// Camera motion applied every frame (left, right, forward,
        /// backward, up, down, yaw-left, yaw-right, pitch-up, pitch-down).
        #[arg(long = "motion")]
        motions: Vec<CameraMotion>,
    },

    /// Print mesh statistics.
    Inspect {
        /// Path to mesh file (.obj or .json).
        path: String,
    },

    /// Print the vertex matrix after every pipeline stage of one frame.
    Dump {
        #[arg(short, long)]
        mesh: Option<String>,

        #[arg(short, long)]
        config: Option<String>,
    },

    /// Validate a mesh or renderer config.
    Validate {
        /// Path to a .toml config or a .obj/.json mesh.
        path: String,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render {
            mesh,
            config,
            frames,
            output,
            motions,
        } => commands::render(
            mesh.as_deref(),
            config.as_deref(),
            frames,
            output.as_deref(),
            &motions,
        ),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Dump { mesh, config } => commands::dump(mesh.as_deref(), config.as_deref()),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
