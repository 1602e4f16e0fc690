use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants;
use crate::utils::logger;

/// Settings read from `Labeler.config`, a `key = value` file in the working
/// directory. A missing file or key leaves the default in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Frames moved by the `h`/`l` keys.
    pub large_step: usize,
    /// Renders a status message stays on screen.
    pub message_frames: u32,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            large_step: constants::DEFAULT_LARGE_STEP,
            message_frames: constants::DEFAULT_MESSAGE_FRAMES,
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(Path::new(constants::CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                logger::info(&format!("Loaded config from {}", path.display()));
                Self::parse(&content)
            }
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                logger::warn(&format!("Ignoring config line without '=': {}", trimmed));
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "large-step" => match value.parse::<usize>() {
                    Ok(step) if step > 0 => config.large_step = step,
                    _ => logger::warn(&format!("Invalid large-step '{}', keeping default", value)),
                },
                "message-frames" => match value.parse::<u32>() {
                    Ok(frames) => config.message_frames = frames,
                    Err(_) => {
                        logger::warn(&format!("Invalid message-frames '{}', keeping default", value))
                    }
                },
                "output-dir" if !value.is_empty() => config.output_dir = PathBuf::from(value),
                _ => logger::debug(&format!("Ignoring config key '{}'", key)),
            }
        }

        config
    }
}
