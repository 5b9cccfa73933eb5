//! hand_tone — command-line entry point.

use std::path::PathBuf;

use clap::Parser;
use hand_tone::app::{run, AppConfig};
use hand_tone::controller::DEFAULT_ALPHA;
use hand_tone::player::OutputKind;
use hand_tone::tracking::{FrameTransform, Thresholds};

#[derive(Parser, Debug)]
#[command(version, about = "Steer a looping clip with your hand")]
struct Cli {
    /// Control strategies to enable, in order (filter, tempo, volume).
    #[arg(long, value_delimiter = ',', default_value = "filter")]
    strategies: Vec<String>,

    /// Cursor smoothing factor in (0, 1]; 1 disables smoothing.
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    alpha: f32,

    /// WAV clip to loop.
    #[arg(long)]
    audio: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputKind::Audio)]
    output: OutputKind,

    /// Play a JSON-lines tracking recording instead of live input.
    #[arg(long)]
    replay: Option<PathBuf>,

    #[arg(long, default_value_t = 30.0)]
    replay_fps: f32,

    /// Restart the recording when it ends.
    #[arg(long)]
    replay_loop: bool,

    /// Don't mirror tracked x coordinates.
    #[arg(long)]
    no_mirror: bool,

    /// Border crop applied by the tracker, undone before mapping.
    #[arg(long, default_value_t = 0.01)]
    padding: f32,

    #[arg(long, default_value_t = 0.5)]
    hand_threshold: f32,

    #[arg(long, default_value_t = 0.5)]
    pinch_threshold: f32,

    #[arg(long, default_value_t = 0.5)]
    fist_threshold: f32,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        AppConfig {
            strategies: cli.strategies,
            alpha:      cli.alpha,
            thresholds: Thresholds {
                is_hand_present: cli.hand_threshold,
                pinch:           cli.pinch_threshold,
                fist:            cli.fist_threshold,
            },
            transform:  FrameTransform { mirror_x: !cli.no_mirror, padding: cli.padding },
            output:     cli.output,
            audio:      cli.audio,
            replay:     cli.replay,
            replay_fps: cli.replay_fps,
            replay_loop: cli.replay_loop,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    #[cfg(feature = "leap")]
    log::info!("mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    log::info!("mode: mouse simulation (use --features leap for hardware)");

    run(AppConfig::from(cli))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_app_config() {
        let cli = Cli::parse_from(["hand_tone"]);
        assert_eq!(AppConfig::from(cli), AppConfig::default());
    }

    #[test]
    fn strategies_are_comma_separated() {
        let cli = Cli::parse_from(["hand_tone", "--strategies", "filter,tempo,volume", "--no-mirror"]);
        let cfg = AppConfig::from(cli);
        assert_eq!(cfg.strategies, vec!["filter", "tempo", "volume"]);
        assert!(!cfg.transform.mirror_x);
    }

    #[test]
    fn output_kind_parses() {
        let cli = Cli::parse_from(["hand_tone", "--output", "midi"]);
        assert_eq!(cli.output, OutputKind::Midi);
    }
}
