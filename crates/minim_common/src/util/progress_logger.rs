/// A source of progress sessions.  Loggers are consumed by starting a session, so each one
/// reports on exactly one pass.
pub trait ProgressLogger {
    type Session: ProgressSession;

    /// `total_count` is the number of items the pass will process, if it is known up front.
    fn start_session(self, total_count: Option<usize>) -> Self::Session;
}

pub trait ProgressSession {
    /// Records that `completed` more items are done.  Counts are increments, not positions.
    fn update(&mut self, completed: usize);

    fn finish(self);
}

/// Reports nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hidden;

impl ProgressLogger for Hidden {
    type Session = Hidden;

    fn start_session(self, _total_count: Option<usize>) -> Self::Session {
        Hidden
    }
}

impl ProgressSession for Hidden {
    fn update(&mut self, _completed: usize) {}

    fn finish(self) {}
}
