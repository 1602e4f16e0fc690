use anyhow::{anyhow, Result};
use serde::Serialize;
use std::path::PathBuf;

use super::dispatcher::{dispatch, Event, FinishReason, Outcome};
use super::session::{AttemptInterval, Mark, OpenAttempt, Session};
use crate::decoder::{FrameData, FrameSource};
use crate::export::RecordExporter;
use crate::renderer::{DisplaySink, Overlay};
use crate::utils::logger;

/// Transient status text shown for a fixed number of renders.
#[derive(Debug, Default)]
struct StatusMessage {
    text: Option<String>,
    remaining: u32,
}

impl StatusMessage {
    fn show(&mut self, text: String, renders: u32) {
        self.text = Some(text);
        self.remaining = renders;
    }

    fn current(&self) -> Option<&str> {
        if self.remaining > 0 {
            self.text.as_deref()
        } else {
            None
        }
    }

    fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Outcome of one labeling session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub reason: FinishReason,
    pub total_frames: usize,
    pub fps: f64,
    pub last_frame: usize,
    pub actions: u64,
    pub intervals: Vec<AttemptInterval>,
    pub discarded_open: Option<OpenAttempt>,
    pub output: PathBuf,
}

/// Status text for an applied action, if it deserves one.
pub fn status_text(event: &Event) -> Option<String> {
    match event {
        Event::Moved { .. } => None,
        Event::Rewound(rewind) if !rewind.invalidated_anything() => None,
        Event::Rewound(rewind) => {
            let mut parts: Vec<String> = rewind
                .erased
                .iter()
                .map(|attempt| format!("Attempt {} erased!", attempt.number))
                .collect();
            if let Some(open) = rewind.aborted {
                parts.push(format!("Attempt {} start discarded", open.number));
            }
            Some(parts.join(" "))
        }
        Event::Marked(Mark::Opened(open)) => Some(format!(
            "Attempt {} start marked at frame {}",
            open.number, open.start_frame
        )),
        Event::Marked(Mark::AlreadyOpen(open)) => {
            Some(format!("Attempt {} already open", open.number))
        }
        Event::Marked(Mark::Closed(attempt)) => {
            Some(format!("Attempt {} recorded!", attempt.number))
        }
        Event::Marked(Mark::NothingOpen) => {
            Some("Press 1 to mark a start first".to_string())
        }
    }
}

/// Runs the render / read / apply loop until the end of the video or a quit,
/// then exports the completed attempts once.
///
/// `message_frames` is how many renders a status message stays visible.
pub fn run_session<S, D, E>(
    source: &mut S,
    sink: &mut D,
    exporter: &E,
    message_frames: u32,
) -> Result<SessionReport>
where
    S: FrameSource,
    D: DisplaySink,
    E: RecordExporter,
{
    let total_frames = source.frame_count();
    let fps = source.fps();
    let mut session =
        Session::new(total_frames).ok_or_else(|| anyhow!("Video has no frames"))?;

    logger::info(&format!(
        "Session started: {} frames @ {:.2} fps",
        total_frames, fps
    ));

    let mut status = StatusMessage::default();
    let mut shown: Option<FrameData> = None;
    let mut actions = 0u64;

    let reason = loop {
        let mut refit = false;
        if let Some((width, height)) = sink.take_resize() {
            logger::debug(&format!("Display resized, frame area {}x{}", width, height));
            source.fit_within(width, height);
            refit = true;
        }

        let index = session.current_frame();
        if refit || shown.as_ref().map(|frame| frame.index) != Some(index) {
            match source.get_frame(index) {
                Ok(frame) => shown = Some(frame),
                // Keep showing the last good frame; navigation still works
                Err(e) => logger::error(&format!("Frame {}: {:#}", index, e)),
            }
        }

        let blank;
        let frame = match shown.as_ref() {
            Some(frame) => frame,
            None => {
                blank = FrameData::blank(index, 1, 1);
                &blank
            }
        };

        let overlay = Overlay::from_session(&session, fps, status.current());
        sink.render(frame, &overlay)?;
        status.tick();

        let action = sink.read_action()?;
        actions += 1;
        match dispatch(&mut session, action) {
            Outcome::Continue(event) => {
                if let Some(text) = status_text(&event) {
                    status.show(text, message_frames);
                }
            }
            Outcome::Finish(reason) => break reason,
        }
    };

    logger::info(&format!(
        "Session finished: {:?} at frame {} after {} actions{}",
        reason,
        session.current_frame(),
        actions,
        if session.is_open() { " (attempt still open)" } else { "" }
    ));

    let finished = session.finish();
    let output = exporter.export(&finished.completed)?;

    Ok(SessionReport {
        reason,
        total_frames,
        fps,
        last_frame: finished.last_frame,
        actions,
        intervals: finished.completed,
        discarded_open: finished.discarded_open,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatcher::Action;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct FakeSource {
        frames: usize,
        fail_on: Option<usize>,
        reads: Vec<usize>,
        size: (u32, u32),
    }

    impl FakeSource {
        fn new(frames: usize) -> Self {
            Self { frames, fail_on: None, reads: Vec::new(), size: (2, 2) }
        }
    }

    impl FrameSource for FakeSource {
        fn frame_count(&self) -> usize {
            self.frames
        }

        fn fps(&self) -> f64 {
            10.0
        }

        fn get_frame(&mut self, index: usize) -> Result<FrameData> {
            assert!(index < self.frames, "frame {} out of bounds", index);
            self.reads.push(index);
            if self.fail_on == Some(index) {
                return Err(anyhow!("corrupt frame"));
            }
            let (width, height) = self.size;
            Ok(FrameData::new(index, vec![0; (width * height * 3) as usize], width, height))
        }

        fn fit_within(&mut self, max_width: u32, max_height: u32) {
            self.size = (max_width, max_height);
        }
    }

    /// Plays back a fixed list of actions and records what was rendered.
    struct ScriptedSink {
        actions: VecDeque<Action>,
        rendered: Vec<(usize, Overlay)>,
        sizes: Vec<(u32, u32)>,
        // Resize reported after the given number of reads.
        resize_after: Option<(usize, (u32, u32))>,
        reads: usize,
        resized: Option<(u32, u32)>,
    }

    impl ScriptedSink {
        fn new(actions: Vec<Action>) -> Self {
            Self {
                actions: actions.into(),
                rendered: Vec::new(),
                sizes: Vec::new(),
                resize_after: None,
                reads: 0,
                resized: None,
            }
        }
    }

    impl DisplaySink for ScriptedSink {
        fn render(&mut self, frame: &FrameData, overlay: &Overlay) -> Result<()> {
            self.rendered.push((frame.index, overlay.clone()));
            self.sizes.push((frame.width, frame.height));
            Ok(())
        }

        fn read_action(&mut self) -> Result<Action> {
            self.reads += 1;
            if let Some((after, area)) = self.resize_after {
                if self.reads == after {
                    self.resized = Some(area);
                }
            }
            self.actions
                .pop_front()
                .ok_or_else(|| anyhow!("script exhausted"))
        }

        fn take_resize(&mut self) -> Option<(u32, u32)> {
            self.resized.take()
        }
    }

    #[derive(Default)]
    struct MemoryExporter {
        calls: RefCell<Vec<Vec<AttemptInterval>>>,
    }

    impl RecordExporter for MemoryExporter {
        fn export(&self, intervals: &[AttemptInterval]) -> Result<PathBuf> {
            self.calls.borrow_mut().push(intervals.to_vec());
            Ok(PathBuf::from("memory.csv"))
        }
    }

    fn spans(intervals: &[AttemptInterval]) -> Vec<(usize, usize)> {
        intervals.iter().map(|a| (a.start_frame, a.end_frame)).collect()
    }

    fn scenario(rewind_to: usize) -> Vec<Action> {
        vec![
            Action::Advance(50),
            Action::MarkStart,
            Action::Advance(50),
            Action::MarkEnd,
            Action::Advance(50),
            Action::MarkStart,
            Action::Rewind(150 - rewind_to),
            Action::Quit,
        ]
    }

    fn run(frames: usize, actions: Vec<Action>) -> (SessionReport, ScriptedSink, MemoryExporter) {
        let mut source = FakeSource::new(frames);
        let mut sink = ScriptedSink::new(actions);
        let exporter = MemoryExporter::default();
        let report = run_session(&mut source, &mut sink, &exporter, 3).unwrap();
        (report, sink, exporter)
    }

    #[test]
    fn test_rewind_to_90_keeps_first_attempt() {
        let (report, _, exporter) = run(200, scenario(90));
        assert_eq!(report.reason, FinishReason::Quit);
        assert_eq!(spans(&report.intervals), vec![(50, 100)]);
        assert!(report.discarded_open.is_none());
        assert_eq!(exporter.calls.borrow().len(), 1);
        assert_eq!(spans(&exporter.calls.borrow()[0]), vec![(50, 100)]);
    }

    #[test]
    fn test_rewind_to_10_erases_all() {
        let (report, _, exporter) = run(200, scenario(10));
        assert!(report.intervals.is_empty());
        assert!(exporter.calls.borrow()[0].is_empty());
    }

    #[test]
    fn test_end_of_sequence_exports_once() {
        let mut actions = vec![Action::MarkStart, Action::Advance(3), Action::MarkEnd];
        actions.extend(std::iter::repeat(Action::Advance(1)).take(10));
        let mut source = FakeSource::new(5);
        let mut sink = ScriptedSink::new(actions);
        let exporter = MemoryExporter::default();

        let report = run_session(&mut source, &mut sink, &exporter, 3).unwrap();
        assert_eq!(report.reason, FinishReason::EndOfSequence);
        assert_eq!(report.last_frame, 4);
        assert_eq!(spans(&report.intervals), vec![(0, 3)]);
        assert_eq!(exporter.calls.borrow().len(), 1);
        // Script left over: the loop stopped at the first advance past the end
        assert_eq!(sink.actions.len(), 8);
    }

    #[test]
    fn test_open_attempt_at_quit_is_not_exported() {
        let (report, _, exporter) = run(
            50,
            vec![Action::Advance(5), Action::MarkStart, Action::Advance(5), Action::Quit],
        );
        assert!(exporter.calls.borrow()[0].is_empty());
        assert_eq!(report.discarded_open.map(|a| a.start_frame), Some(5));
    }

    #[test]
    fn test_status_message_expires() {
        let (_, sink, _) = run(
            50,
            vec![
                Action::MarkEnd,
                Action::Advance(1),
                Action::Advance(1),
                Action::Advance(1),
                Action::Quit,
            ],
        );
        let messages: Vec<bool> = sink
            .rendered
            .iter()
            .map(|(_, overlay)| overlay.message.is_some())
            .collect();
        assert_eq!(messages, vec![false, true, true, true, false]);
    }

    #[test]
    fn test_frames_are_read_once_per_position() {
        let mut source = FakeSource::new(20);
        let mut sink = ScriptedSink::new(vec![
            Action::MarkStart,
            Action::MarkEnd,
            Action::Advance(2),
            Action::Rewind(1),
            Action::Quit,
        ]);
        let exporter = MemoryExporter::default();
        run_session(&mut source, &mut sink, &exporter, 3).unwrap();
        assert_eq!(source.reads, vec![0, 2, 1]);
    }

    #[test]
    fn test_unreadable_frame_keeps_session_alive() {
        let mut source = FakeSource::new(10);
        source.fail_on = Some(1);
        let mut sink = ScriptedSink::new(vec![Action::Advance(1), Action::Advance(1), Action::Quit]);
        let exporter = MemoryExporter::default();

        let report = run_session(&mut source, &mut sink, &exporter, 3).unwrap();
        assert_eq!(report.last_frame, 2);
        let shown: Vec<usize> = sink.rendered.iter().map(|(index, _)| *index).collect();
        assert_eq!(shown, vec![0, 0, 2]);
        assert_eq!(sink.rendered[1].1.frame, 1);
    }

    #[test]
    fn test_empty_video_is_rejected_before_export() {
        let mut source = FakeSource::new(0);
        let mut sink = ScriptedSink::new(vec![Action::Quit]);
        let exporter = MemoryExporter::default();
        assert!(run_session(&mut source, &mut sink, &exporter, 3).is_err());
        assert!(exporter.calls.borrow().is_empty());
        assert!(sink.rendered.is_empty());
    }

    #[test]
    fn test_status_text_for_erasures() {
        let mut session = Session::new(100).unwrap();
        session.advance(10);
        session.mark_start();
        session.advance(10);
        session.mark_end();
        session.advance(10);
        session.mark_start();
        let event = Event::Rewound(session.rewind(25));
        assert_eq!(
            status_text(&event).as_deref(),
            Some("Attempt 1 erased! Attempt 2 start discarded")
        );
    }

    #[test]
    fn test_status_text_for_redundant_marks() {
        let mut session = Session::new(100).unwrap();
        assert_eq!(
            status_text(&Event::Marked(session.mark_end())).as_deref(),
            Some("Press 1 to mark a start first")
        );
        session.mark_start();
        session.advance(5);
        assert_eq!(
            status_text(&Event::Marked(session.mark_start())).as_deref(),
            Some("Attempt 1 already open")
        );
    }

    #[test]
    fn test_resize_refits_and_rereads_current_frame() {
        let mut source = FakeSource::new(20);
        let mut sink = ScriptedSink::new(vec![
            Action::Advance(3),
            Action::MarkStart,
            Action::Advance(1),
            Action::Quit,
        ]);
        // Resize arrives while the second action is being read
        sink.resize_after = Some((2, (8, 6)));
        let exporter = MemoryExporter::default();

        run_session(&mut source, &mut sink, &exporter, 3).unwrap();
        assert_eq!(source.reads, vec![0, 3, 3, 4]);
        assert_eq!(sink.sizes, vec![(2, 2), (2, 2), (8, 6), (8, 6)]);
        assert!(sink.take_resize().is_none());
    }
}
