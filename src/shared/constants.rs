pub const APP_NAME: &str = "attempt-labeler";

pub const CONFIG_FILE: &str = "Labeler.config";
pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

pub const OUTPUT_SUFFIX: &str = "_attempt_ground_truth";
pub const OUTPUT_EXTENSION: &str = "csv";
pub const CSV_COLUMNS: &[&str] = &[
    "attempt_number",
    "attempt_start_time",
    "attempt_end_time",
    "attempt_start_frame",
    "attempt_end_frame",
];

pub const DEFAULT_LARGE_STEP: usize = 10;
pub const DEFAULT_MESSAGE_FRAMES: u32 = 60;
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Terminal rows reserved under the frame for status text.
pub const HUD_ROWS: usize = 4;

pub const KEY_HELP: &str =
    "any key: advance | r: rewind | h/l: big step back/forward | 1: mark start | 2: mark end | q: quit";
