//! Gungeon Assault headless runner
//!
//! Drives the simulation in demo mode on a simulated 60 Hz clock, plays the
//! sound cues through the logging backend and prints the final snapshot as
//! JSON. Useful for soak-testing balance changes without a renderer.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;
    use gungeon_assault::Settings;
    use gungeon_assault::audio::{AudioManager, LogAudio};
    use gungeon_assault::sim::{GamePhase, GameState, TickInput, Timestamp, tick};

    /// Simulated frame length (ms)
    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[derive(Parser, Debug)]
    #[command(name = "gungeon-assault")]
    #[command(about = "Run the shooter in demo mode and print the final snapshot")]
    pub(crate) struct Args {
        /// Frames to simulate at 60 Hz
        #[arg(long, default_value_t = 3600)]
        pub frames: u64,

        /// Seed override for the run
        #[arg(long)]
        pub seed: Option<u64>,

        /// Settings JSON to load
        #[arg(long)]
        pub settings: Option<PathBuf>,

        /// Start in survival mode
        #[arg(long)]
        pub survival: bool,
    }

    pub fn run() -> ExitCode {
        env_logger::init();
        let args = Args::parse();

        let mut settings = match &args.settings {
            Some(path) => Settings::load(path),
            None => Settings::default(),
        };
        if args.seed.is_some() {
            settings.seed = args.seed;
        }
        settings.survival_mode |= args.survival;

        let mut audio = AudioManager::from_settings(LogAudio, &settings);
        let mut state = GameState::new(settings);
        log::info!("Gungeon Assault (headless) seed {}", state.seed);

        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut now = Timestamp::ZERO;
        let mut runs = 0u32;
        for _ in 0..args.frames {
            let was_over = state.phase == GamePhase::GameOver;
            tick(&mut state, &input, now);
            audio.play_all(state.drain_sounds());
            if !was_over && state.phase == GamePhase::GameOver {
                runs += 1;
            }
            now = now.after(FRAME_MS);
        }

        log::info!(
            "Finished {} frames: wave {}, score {}, {} runs ended",
            args.frames,
            state.wave(),
            state.score,
            runs
        );

        match serde_json::to_string_pretty(&state.snapshot(now)) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to serialize snapshot: {e}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use clap::Parser;

    use super::native::Args;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["gungeon-assault"]).unwrap();
        assert_eq!(args.frames, 3600);
        assert_eq!(args.seed, None);
        assert!(args.settings.is_none());
        assert!(!args.survival);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "gungeon-assault",
            "--frames=10",
            "--seed",
            "7",
            "--settings",
            "run.json",
            "--survival",
        ])
        .unwrap();
        assert_eq!(args.frames, 10);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.settings.unwrap().to_str(), Some("run.json"));
        assert!(args.survival);
    }

    #[test]
    fn test_args_rejects_bad_values() {
        assert!(Args::try_parse_from(["gungeon-assault", "--frames", "many"]).is_err());
        assert!(Args::try_parse_from(["gungeon-assault", "--turbo"]).is_err());
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser shell drives `sim::tick` directly
}
