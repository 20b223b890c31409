use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use watchgate_core::{
    AttentionSession, Calibrator, ConfirmOutcome, GazeSample, SessionEvent, SimulatedPlayer,
    TickOutcome, Viewport, WatchgateConfig,
};

mod script;

use script::ScriptEvent;

#[derive(Parser)]
#[command(name = "watchgate", about = "Gaze-gated playback replay and config tool")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines event script through a simulated player
    Replay {
        script: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print status snapshots as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the calibration order with pixel positions
    Targets {
        #[arg(long)]
        width: Option<f32>,
        #[arg(long)]
        height: Option<f32>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate and print the effective configuration
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "watchgate=info".parse() {
        filter = filter.add_directive(d);
    }
    if let Ok(d) = "watchgate_core=info".parse() {
        filter = filter.add_directive(d);
    }

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&Path>) -> Result<WatchgateConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => WatchgateConfig::from_file_with_env(path)?,
        None => WatchgateConfig::load_layered(None, None)?,
    };
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Replay {
            script,
            config,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            replay(&script, &config, json)?;
        }
        Commands::Targets {
            width,
            height,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let viewport = Viewport::new(
                width.unwrap_or(config.viewport.width),
                height.unwrap_or(config.viewport.height),
            );
            if !viewport.is_valid() {
                return Err(format!("invalid viewport {}x{}", viewport.width, viewport.height).into());
            }
            let calibrator = Calibrator::with_config(&config.calibration)?;
            for (step, &id) in calibrator.sequence().ids().iter().enumerate() {
                if let Some(target) = calibrator.target(id) {
                    let (x, y) = target.pixel_position(&viewport);
                    println!(
                        "{:>2}. target {} at ({:.0}, {:.0}){}",
                        step + 1,
                        id,
                        x,
                        y,
                        if target.is_anchor { " [anchor]" } else { "" }
                    );
                }
            }
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml_string()?);
        }
    }
    Ok(())
}

fn replay(
    path: &Path,
    config: &WatchgateConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let lines = script::load(path)?;
    info!("Replaying {} events from {}", lines.len(), path.display());

    let mut session = AttentionSession::new(config, SimulatedPlayer::new())?;
    let mut frames = 0u64;

    for entry in lines {
        match entry.event {
            ScriptEvent::Viewport { width, height } => {
                session.set_viewport(Viewport::new(width, height))?;
            }
            ScriptEvent::Confirm { target } => {
                let outcome = session.confirm_target(target);
                if let ConfirmOutcome::Rejected = outcome {
                    debug!("line {}: click on target {} ignored", entry.line, target);
                }
            }
            ScriptEvent::Restart => {
                let outcome = session.restart();
                info!(
                    "line {}: recalibrating (was {:?}); gaze model data cleared",
                    entry.line, outcome.previous_state
                );
            }
            ScriptEvent::Gaze(sample) => {
                frames += 1;
                tick(&mut session, sample, json)?;
            }
            ScriptEvent::NoFace => {
                frames += 1;
                tick(&mut session, GazeSample::no_face(), json)?;
            }
        }
        report_events(&mut session, entry.line);
    }

    let status = session.status();
    let gate = session.gate();
    if json {
        let summary = serde_json::json!({
            "frames": frames,
            "ticks": status.ticks,
            "plays": gate.plays_issued(),
            "pauses": gate.pauses_issued(),
            "playing": gate.is_playing(),
            "calibrated": session.is_calibrated(),
        });
        println!("{}", summary);
    } else {
        println!(
            "summary: frames={} ticks={} plays={} pauses={} final={}",
            frames,
            status.ticks,
            gate.plays_issued(),
            gate.pauses_issued(),
            if gate.is_playing() { "playing" } else { "paused" }
        );
    }
    Ok(())
}

fn tick(
    session: &mut AttentionSession<SimulatedPlayer>,
    sample: GazeSample,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let TickOutcome::Decided {
        command: Some(cmd), ..
    } = session.on_sample(sample)
    {
        debug!("player <- {:?}", cmd);
    }

    let status = session.status();
    if json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        println!("{}", status);
    }
    Ok(())
}

fn report_events(session: &mut AttentionSession<SimulatedPlayer>, line: usize) {
    for event in session.drain_events() {
        match event {
            SessionEvent::ReferenceCaptureFailed => {
                warn!("line {}: no usable face at the anchor, pose checks disabled", line)
            }
            SessionEvent::CalibrationFinished { reference_set } => {
                info!("line {}: calibration finished (reference set: {})", line, reference_set)
            }
            other => debug!("line {}: {:?}", line, other),
        }
    }
}
