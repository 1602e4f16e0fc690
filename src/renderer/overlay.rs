use crate::core::session::{OpenAttempt, Session};
use crate::shared::constants;

/// Read-only view of the session handed to the display along with a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub frame: usize,
    pub total_frames: usize,
    pub fps: f64,
    pub open: Option<OpenAttempt>,
    pub recorded: usize,
    pub message: Option<String>,
}

impl Overlay {
    pub fn from_session(session: &Session, fps: f64, message: Option<&str>) -> Self {
        Self {
            frame: session.current_frame(),
            total_frames: session.total_frames(),
            fps,
            open: session.open_attempt(),
            recorded: session.completed_intervals().len(),
            message: message.map(str::to_string),
        }
    }

    pub fn seconds(&self) -> f64 {
        frame_seconds(self.frame, self.fps)
    }

    /// Status lines, top to bottom. Always `constants::HUD_ROWS` entries so
    /// stale text is cleared between renders.
    pub fn lines(&self) -> Vec<String> {
        let position = format!(
            "Frame: {} / {} | Time: {:.2}s | Recorded: {}",
            self.frame,
            self.total_frames,
            self.seconds(),
            self.recorded
        );
        let attempt = self
            .open
            .map(|open| {
                format!(
                    "Attempt {} - Start marked at frame {}",
                    open.number, open.start_frame
                )
            })
            .unwrap_or_default();

        vec![
            constants::KEY_HELP.to_string(),
            position,
            attempt,
            self.message.clone().unwrap_or_default(),
        ]
    }
}

/// Seconds from the start of the video for `frame`; 0 when the rate is unknown.
pub fn frame_seconds(frame: usize, fps: f64) -> f64 {
    if fps > 0.0 {
        frame as f64 / fps
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_show_position_and_open_attempt() {
        let mut session = Session::new(300).unwrap();
        session.advance(60);
        session.mark_start();

        let overlay = Overlay::from_session(&session, 30.0, Some("hello"));
        let lines = overlay.lines();
        assert_eq!(lines.len(), constants::HUD_ROWS);
        assert_eq!(lines[1], "Frame: 60 / 300 | Time: 2.00s | Recorded: 0");
        assert_eq!(lines[2], "Attempt 1 - Start marked at frame 60");
        assert_eq!(lines[3], "hello");
    }

    #[test]
    fn test_blank_lines_when_idle() {
        let session = Session::new(10).unwrap();
        let lines = Overlay::from_session(&session, 0.0, None).lines();
        assert_eq!(lines[1], "Frame: 0 / 10 | Time: 0.00s | Recorded: 0");
        assert!(lines[2].is_empty());
        assert!(lines[3].is_empty());
    }

    #[test]
    fn test_last_frame_position_shows_frame_count() {
        let mut session = Session::new(10).unwrap();
        session.advance(100);
        let lines = Overlay::from_session(&session, 5.0, None).lines();
        assert_eq!(lines[1], "Frame: 9 / 10 | Time: 1.80s | Recorded: 0");
    }
}
