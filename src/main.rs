mod core;
mod decoder;
mod export;
mod renderer;
mod shared;
mod ui;
mod utils;

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::core::labeler;
use crate::decoder::{FrameSource, VideoSource};
use crate::export::CsvExporter;
use crate::renderer::TerminalSink;
use crate::shared::constants;
use crate::utils::{config::Config, logger};

/// Step through a video and mark the start and end frame of each attempt.
///
/// Keys: any key advances one frame, r rewinds one frame, h/l jump back or
/// forward, 1 marks an attempt start, 2 marks its end, q quits and saves.
/// Rewinding to or before an attempt's start erases it.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Video file to label
    video: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init();

    // Reset terminal state left behind by an earlier crash
    let _ = crossterm::terminal::disable_raw_mode();

    let config = Config::load();
    logger::debug(&format!("Config: {:?}", config));

    let mut source = VideoSource::open(&cli.video)?;
    if source.frame_count() == 0 {
        bail!("Video file '{}' has no frames", cli.video.display());
    }

    println!("Video loaded: {}", source.path().display());
    println!("FPS: {:.2}, Total frames: {}", source.fps(), source.frame_count());

    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let (max_w, max_h) = TerminalSink::frame_area(cols, rows);
    source.fit_within(max_w, max_h);

    let exporter = CsvExporter::for_video(&cli.video, &config.output_dir, source.fps());
    println!("Output will be saved to: {}", exporter.path().display());

    let result = {
        let mut sink = TerminalSink::new(config.large_step)?;
        labeler::run_session(&mut source, &mut sink, &exporter, config.message_frames)
        // sink dropped here, giving the terminal back before anything is printed
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            logger::error(&format!("Session failed: {:#}", e));
            return Err(e);
        }
    };

    match serde_json::to_string(&report) {
        Ok(json) => logger::info(&format!("Session summary: {}", json)),
        Err(e) => logger::error(&format!("Could not serialise session summary: {}", e)),
    }

    if let Some(open) = report.discarded_open {
        println!(
            "Attempt {} (start frame {}) had no end mark and was not saved.",
            open.number, open.start_frame
        );
    }
    println!(
        "{}: {} attempts recorded.",
        constants::APP_NAME,
        report.intervals.len()
    );
    println!("Data saved to: {}", report.output.display());

    Ok(())
}
