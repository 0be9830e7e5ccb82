use std::{borrow::Cow, time::Duration};

use crate::util::progress_logger::{ProgressLogger, ProgressSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProgressMode {
    Hidden,
    Visible,
}

#[derive(Clone, Debug)]
pub struct ProgressBarLogger {
    name: String,
    mode: ProgressMode,
}

pub fn bar(mode: ProgressMode, name: impl ToString) -> ProgressBarLogger {
    ProgressBarLogger {
        name: name.to_string(),
        mode,
    }
}

#[derive(Clone, Debug)]
pub struct ProgressBarSession {
    bar: indicatif::ProgressBar,
}

const TICK_STRINGS: &[&str] = &["⠉", "⠘", "⠰", "⠤", "⠆", "⠃", "✔"];

fn style_for(count: Option<usize>) -> indicatif::ProgressStyle {
    let (base, template) = match count {
        Some(_) => (
            indicatif::ProgressStyle::default_bar(),
            "{spinner:.cyan} [{elapsed_precise}] [{bar:.cyan/blue}] {pos}/{len} {msg}",
        ),
        None => (
            indicatif::ProgressStyle::default_spinner(),
            "{spinner:.cyan} [{elapsed_precise}] {msg}",
        ),
    };

    // Both templates are constant, so the fallback is only reachable through a typo above.
    base.clone()
        .template(template)
        .unwrap_or(base)
        .progress_chars("=> ")
        .tick_strings(TICK_STRINGS)
}

impl ProgressLogger for ProgressBarLogger {
    type Session = ProgressBarSession;

    fn start_session(self, count: Option<usize>) -> Self::Session {
        let bar = indicatif::ProgressBar::with_draw_target(
            count.map(|count| count as u64),
            match self.mode {
                ProgressMode::Hidden => indicatif::ProgressDrawTarget::hidden(),
                ProgressMode::Visible => indicatif::ProgressDrawTarget::stderr(),
            },
        );
        bar.set_style(style_for(count));
        bar.set_message(Cow::Owned(self.name));
        if self.mode == ProgressMode::Visible {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        ProgressBarSession { bar }
    }
}

impl ProgressSession for ProgressBarSession {
    fn update(&mut self, completed: usize) {
        self.bar.inc(completed as u64);
    }

    fn finish(self) {
        self.bar.finish();
    }
}
