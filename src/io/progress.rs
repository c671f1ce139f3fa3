//! Terminal progress for batches of string art runs

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

#[derive(Clone, Debug, Default)]
struct RunLine {
    name: String,
    step: usize,
    max_steps: usize,
}

/// Coordinates progress display for a batch of images
///
/// Small batches get one bar per image; larger ones add an overall bar and
/// show a rolling window of the most recent images.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    run_bars: Vec<ProgressBar>,
    lines: Vec<RunLine>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static RUN_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Images: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            run_bars: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Create bars for a batch of `image_count` images
    pub fn initialize(&mut self, image_count: usize) {
        if image_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(image_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..image_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new(0);
            bar.set_style(RUN_STYLE.clone());
            self.run_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Register the run for image `index`
    pub fn start_run(&mut self, index: usize, path: &Path, max_steps: usize) {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if index >= self.lines.len() {
            self.lines.resize(index + 1, RunLine::default());
        }
        if let Some(line) = self.lines.get_mut(index) {
            *line = RunLine {
                name,
                step: 0,
                max_steps,
            };
        }
        self.redraw();
    }

    /// Report the latest completed step of image `index`
    pub fn update_step(&mut self, index: usize, step: usize, _elapsed: Duration) {
        if let Some(line) = self.lines.get_mut(index) {
            line.step = step;
        }
        self.redraw();
    }

    /// Mark image `index` as done after `steps` steps
    ///
    /// A run that exhausted early shrinks its bar to the steps it took.
    pub fn complete_run(&mut self, index: usize, steps: usize, _elapsed: Duration) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
        if let Some(line) = self.lines.get_mut(index) {
            line.name = format!("✓ {}", line.name);
            line.step = steps;
            line.max_steps = steps;
        }
        self.redraw();
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All images processed");
        }
        let _ = self.multi_progress.clear();
    }

    // Show the most recent runs in the available bars
    fn redraw(&self) {
        let active: Vec<&RunLine> = self.lines.iter().filter(|l| !l.name.is_empty()).collect();
        let start = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start..).unwrap_or(&[]);

        for (slot, bar) in self.run_bars.iter().enumerate() {
            match visible.get(slot) {
                Some(line) => {
                    bar.set_length(line.max_steps as u64);
                    bar.set_position(line.step as u64);
                    let width = line.max_steps.to_string().len();
                    bar.set_message(format!("{:>width$}/{}", line.step, line.max_steps));
                    bar.set_prefix(line.name.clone());
                }
                None => {
                    bar.set_length(0);
                    bar.set_position(0);
                    bar.set_message(String::new());
                    bar.set_prefix(String::new());
                }
            }
        }
    }
}
