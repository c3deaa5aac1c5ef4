//! courtvision CLI — rally analytics from upstream detector output.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use courtvision::{AnalysisConfig, CourtKeypoint, HomographyMode, RallyAnalyzer, RallyInput};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "courtvision")]
#[command(
    about = "Map tennis rally detections onto a top-down court and compute shot and movement speeds"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one rally from a JSON input bundle.
    Analyze(CliAnalyzeArgs),

    /// Print the mini-court layout for a frame width.
    CourtInfo {
        /// Width of the video frame in pixels.
        #[arg(long, default_value = "1920")]
        frame_width: f64,

        /// Optional analysis configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    /// Path to the rally input (JSON).
    #[arg(long)]
    input: PathBuf,

    /// Path to write the rally report (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Optional analysis configuration (JSON). CLI flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which court keypoints feed the homography.
    #[arg(long, value_enum)]
    homography_mode: Option<HomographyModeArg>,

    /// RANSAC inlier threshold in canonical pixels (all-keypoints mode).
    #[arg(long)]
    ransac_thresh_px: Option<f64>,

    /// Override the frame rate stored in the input.
    #[arg(long)]
    fps: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HomographyModeArg {
    Corners,
    AllKeypoints,
}

impl HomographyModeArg {
    fn to_core(self) -> HomographyMode {
        match self {
            Self::Corners => HomographyMode::Corners,
            Self::AllKeypoints => HomographyMode::AllKeypoints,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> CliResult<AnalysisConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading config: {}", path.display());
            AnalysisConfig::from_json_file(path)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),

        Commands::CourtInfo {
            frame_width,
            config,
        } => run_court_info(frame_width, config.as_ref()),
    }
}

// ── court-info ─────────────────────────────────────────────────────────

fn run_court_info(frame_width: f64, config: Option<&PathBuf>) -> CliResult<()> {
    let config = load_config(config)?;
    config.validate()?;
    let analyzer = RallyAnalyzer::new(config);
    let canvas = analyzer.canvas_for(frame_width);
    let layout = canvas.layout();
    let (top_left, bottom_right) = canvas.bounds();

    println!("courtvision mini court for a {:.0}px wide frame", frame_width);
    println!(
        "  canvas:         ({:.1}, {:.1}) .. ({:.1}, {:.1})",
        top_left.x, top_left.y, bottom_right.x, bottom_right.y
    );
    println!("  court width:    {:.2} px", layout.court_width_px());
    println!("  scale:          {:.3} px/m", layout.pixels_per_meter());
    for kp in CourtKeypoint::ALL {
        let p = layout.keypoint(kp);
        println!("  {:>2} {:<20} ({:.2}, {:.2})", kp.index(), format!("{:?}", kp), p.x, p.y);
    }
    let pairs: Vec<String> = layout
        .lines()
        .index_pairs()
        .iter()
        .map(|[a, b]| format!("{}-{}", a, b))
        .collect();
    println!("  lines:          {}", pairs.join(" "));

    Ok(())
}

// ── analyze ────────────────────────────────────────────────────────────

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(mode) = args.homography_mode {
        config.homography.mode = mode.to_core();
    }
    if let Some(thresh) = args.ransac_thresh_px {
        config.homography.ransac.inlier_threshold = thresh;
    }

    tracing::info!("Loading rally input: {}", args.input.display());
    let mut input = RallyInput::from_json_file(&args.input)?;
    if let Some(fps) = args.fps {
        input.fps = fps;
    }
    tracing::info!(
        "Input: {} player frames, {} ball frames, {} shots at {} fps",
        input.player_detections.len(),
        input.ball_detections.len(),
        input.shot_frames.len(),
        input.fps
    );

    let analyzer = RallyAnalyzer::new(config);
    let report = analyzer.analyze(&input)?;

    for shot in &report.shots {
        tracing::info!(
            "  frames {}..{}: player {} hit {:.1} km/h, player {} moved {:.1} km/h",
            shot.start_frame,
            shot.end_frame,
            shot.shooter,
            shot.ball_speed_kmh,
            shot.opponent,
            shot.opponent_speed_kmh
        );
    }
    for skipped in &report.skipped_segments {
        tracing::warn!(
            "  frames {}..{} skipped: {}",
            skipped.start_frame,
            skipped.end_frame,
            skipped.reason
        );
    }

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Report written to {}", args.out.display());

    Ok(())
}
