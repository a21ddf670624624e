use agent_core::{ProgressView, Stage, StreamError, TrackingStatus};
use colored::*;

const BAR_WIDTH: usize = 20;

/// Incremental terminal renderer: prints the bar when the stage changes and
/// each log line once.
#[derive(Debug, Default)]
pub struct ProgressRenderer {
    last_stage: Option<Stage>,
    printed_log: usize,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &ProgressView) -> Vec<String> {
        let mut lines = Vec::new();
        if self.last_stage != Some(view.stage) {
            self.last_stage = Some(view.stage);
            lines.push(progress_line(view));
        }
        // Log is append-only, so everything past the printed count is new.
        for line in view.log.iter().skip(self.printed_log) {
            lines.push(format!("  {}", line));
        }
        self.printed_log = view.log.len();
        if let Some(status) = status_line(&view.tracking) {
            lines.push(status);
        }
        lines
    }
}

pub fn progress_line(view: &ProgressView) -> String {
    let filled = BAR_WIDTH * usize::from(view.percent) / 100;
    format!(
        "{} [{}{}] {:>3}% {}",
        "[*]".blue(),
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        view.percent,
        stage_label(view.stage)
    )
}

pub fn status_line(tracking: &TrackingStatus) -> Option<String> {
    match tracking {
        TrackingStatus::Live => None,
        TrackingStatus::Completed => Some(format!("{} Task finished", "[✓]".green())),
        TrackingStatus::Stopped => Some(format!("{} Stopped tracking", "[!]".yellow())),
        TrackingStatus::Failed(StreamError::Transport(reason))
        | TrackingStatus::Failed(StreamError::Decode(reason)) => Some(format!(
            "{} Live tracking stopped: {}",
            "[✗]".red(),
            reason
        )),
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Interpret => "Interpreting query",
        Stage::Fetch => "Fetching data",
        Stage::Convert => "Converting",
        Stage::Viz => "Visualizing",
        Stage::Finish => "Finished",
    }
}
