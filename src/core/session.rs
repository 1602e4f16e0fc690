use serde::Serialize;

use crate::utils::logger;

/// A completed attempt: both ends marked, `start_frame <= end_frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptInterval {
    pub number: u32,
    pub start_frame: usize,
    pub end_frame: usize,
}

/// An attempt whose start has been marked but not its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenAttempt {
    pub number: u32,
    pub start_frame: usize,
}

/// Result of a forward move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { from: usize, to: usize },
    /// The cursor was already on the last frame.
    EndOfSequence,
}

/// Result of a backward move, including everything the move invalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewind {
    pub from: usize,
    pub to: usize,
    pub erased: Vec<AttemptInterval>,
    pub aborted: Option<OpenAttempt>,
}

impl Rewind {
    pub fn invalidated_anything(&self) -> bool {
        !self.erased.is_empty() || self.aborted.is_some()
    }
}

/// Result of a mark-start / mark-end action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Opened(OpenAttempt),
    /// mark-start while an attempt was already open; the open one is untouched.
    AlreadyOpen(OpenAttempt),
    Closed(AttemptInterval),
    /// mark-end with nothing open.
    NothingOpen,
}

/// What is left of a session once playback is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    pub completed: Vec<AttemptInterval>,
    pub discarded_open: Option<OpenAttempt>,
    pub last_frame: usize,
}

/// Cursor and interval bookkeeping for one labeling session.
///
/// The cursor always stays inside `[0, total_frames)`. At most one attempt is
/// open at a time, and completed attempts are kept in the order they were
/// closed. Moving the cursor back to or before an attempt's start frame
/// erases that attempt.
#[derive(Debug, Clone)]
pub struct Session {
    total_frames: usize,
    cursor: usize,
    open: Option<OpenAttempt>,
    completed: Vec<AttemptInterval>,
}

impl Session {
    /// Returns `None` for an empty sequence, which has no valid cursor position.
    pub fn new(total_frames: usize) -> Option<Self> {
        if total_frames == 0 {
            return None;
        }

        Some(Self {
            total_frames,
            cursor: 0,
            open: None,
            completed: Vec::new(),
        })
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn current_frame(&self) -> usize {
        self.cursor
    }

    pub fn last_frame(&self) -> usize {
        self.total_frames - 1
    }

    pub fn completed_intervals(&self) -> &[AttemptInterval] {
        &self.completed
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_attempt(&self) -> Option<OpenAttempt> {
        self.open
    }

    /// Number the next opened attempt will get: one past the highest surviving
    /// completed attempt.
    pub fn next_attempt_number(&self) -> u32 {
        self.completed
            .iter()
            .map(|attempt| attempt.number)
            .max()
            .map_or(1, |highest| highest + 1)
    }

    pub fn advance(&mut self, n: usize) -> Advance {
        let from = self.cursor;
        if n > 0 && from == self.last_frame() {
            logger::info(&format!("End of sequence reached at frame {}", from));
            return Advance::EndOfSequence;
        }

        self.cursor = from.saturating_add(n).min(self.last_frame());
        Advance::Moved {
            from,
            to: self.cursor,
        }
    }

    pub fn rewind(&mut self, n: usize) -> Rewind {
        let from = self.cursor;
        self.cursor = from.saturating_sub(n);
        let to = self.cursor;

        let (erased, kept): (Vec<_>, Vec<_>) = self
            .completed
            .drain(..)
            .partition(|attempt| attempt.start_frame >= to);
        self.completed = kept;

        let aborted = self.open.filter(|open| open.start_frame >= to);
        if aborted.is_some() {
            self.open = None;
        }

        for attempt in &erased {
            logger::info(&format!(
                "Attempt {} erased - rewound to frame {} (span {}-{})",
                attempt.number, to, attempt.start_frame, attempt.end_frame
            ));
        }
        if let Some(open) = aborted {
            logger::info(&format!(
                "Attempt {} discarded - rewound to frame {} (start {})",
                open.number, to, open.start_frame
            ));
        }

        Rewind {
            from,
            to,
            erased,
            aborted,
        }
    }

    pub fn mark_start(&mut self) -> Mark {
        if let Some(open) = self.open {
            logger::debug(&format!(
                "Ignoring mark-start: attempt {} already open at frame {}",
                open.number, open.start_frame
            ));
            return Mark::AlreadyOpen(open);
        }

        let open = OpenAttempt {
            number: self.next_attempt_number(),
            start_frame: self.cursor,
        };
        self.open = Some(open);
        logger::info(&format!(
            "Attempt {} start marked at frame {}",
            open.number, open.start_frame
        ));
        Mark::Opened(open)
    }

    pub fn mark_end(&mut self) -> Mark {
        let Some(open) = self.open.take() else {
            logger::debug(&format!(
                "Ignoring mark-end at frame {}: no attempt open",
                self.cursor
            ));
            return Mark::NothingOpen;
        };

        let attempt = AttemptInterval {
            number: open.number,
            start_frame: open.start_frame.min(self.cursor),
            end_frame: open.start_frame.max(self.cursor),
        };
        self.completed.push(attempt);
        logger::info(&format!(
            "Attempt {} recorded: frames {}-{}",
            attempt.number, attempt.start_frame, attempt.end_frame
        ));
        Mark::Closed(attempt)
    }

    /// Ends the session. Consuming `self` makes further mutation impossible.
    pub fn finish(self) -> Finished {
        if let Some(open) = self.open {
            logger::info(&format!(
                "Attempt {} was still open at frame {}; not recorded",
                open.number, open.start_frame
            ));
        }

        Finished {
            completed: self.completed,
            discarded_open: self.open,
            last_frame: self.cursor,
        }
    }
}
