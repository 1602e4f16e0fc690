use serde::Serialize;

use super::session::{Advance, Mark, Rewind, Session};

/// One discrete operator action. A held key arrives as the same action many
/// times over; each delivery is applied on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Advance(usize),
    Rewind(usize),
    MarkStart,
    MarkEnd,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    EndOfSequence,
    Quit,
}

/// What an applied action did, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Moved { from: usize, to: usize },
    Rewound(Rewind),
    Marked(Mark),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Event),
    Finish(FinishReason),
}

/// Applies a single action to the session. The engine is called exactly once.
pub fn dispatch(session: &mut Session, action: Action) -> Outcome {
    match action {
        Action::Advance(n) => match session.advance(n) {
            Advance::Moved { from, to } => Outcome::Continue(Event::Moved { from, to }),
            Advance::EndOfSequence => Outcome::Finish(FinishReason::EndOfSequence),
        },
        Action::Rewind(n) => Outcome::Continue(Event::Rewound(session.rewind(n))),
        Action::MarkStart => Outcome::Continue(Event::Marked(session.mark_start())),
        Action::MarkEnd => Outcome::Continue(Event::Marked(session.mark_end())),
        Action::Quit => Outcome::Finish(FinishReason::Quit),
    }
}
