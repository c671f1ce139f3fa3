//! Command-line interface for batch string art generation

use crate::io::configuration::{
    BOARD_MARGIN, DEFAULT_BOARD, DEFAULT_FADE, DEFAULT_MIN_DIST, DEFAULT_PINS, DEFAULT_SIZE,
    DEFAULT_STRINGS, DEFAULT_STROKE_ALPHA, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, MAX_PINS,
    MAX_SIZE, OUTPUT_SUFFIX, SOURCE_EXTENSIONS,
};
use crate::io::error::{Result, StringArtError, file_system, invalid_parameter};
use crate::io::export::{Preset, StrokeStyle, export_csv, export_json, export_preset, export_svg};
use crate::io::image::{export_preview_png, load_raster};
use crate::io::progress::ProgressManager;
use crate::worker::protocol::{Event, Request, ResultEvent, RunRequest, WorkerState};
use crate::worker::Worker;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "stringloom")]
#[command(
    author,
    version,
    about = "Turn images into string art pin sequences with a greedy chord search"
)]
/// Command-line arguments for the string art tool
// Export toggles are independent user choices
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image file or directory to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Number of pins around the board
    #[arg(short, long, default_value_t = DEFAULT_PINS)]
    pub pins: usize,

    /// Maximum number of strings to place
    #[arg(short, long, default_value_t = DEFAULT_STRINGS)]
    pub strings: usize,

    /// Minimum pin index distance between connected pins
    #[arg(short = 'd', long, default_value_t = DEFAULT_MIN_DIST)]
    pub min_dist: usize,

    /// Brightness each string removes from the residual image
    #[arg(short, long, default_value_t = DEFAULT_FADE)]
    pub fade: u32,

    /// Side length in pixels of the working raster
    #[arg(short = 'S', long, default_value_t = DEFAULT_SIZE)]
    pub size: usize,

    /// String opacity (0-255) in the PNG preview
    #[arg(short, long, default_value_t = DEFAULT_STROKE_ALPHA)]
    pub alpha: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process images even if output exists
    #[arg(short, long)]
    pub no_skip: bool,

    /// Also write an SVG drawing
    #[arg(long)]
    pub svg: bool,

    /// Also write a PNG preview
    #[arg(long)]
    pub png: bool,

    /// Also write the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the run parameters as a JSON preset
    #[arg(long)]
    pub preset: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Reject settings that leave no room for the pin circle
    ///
    /// # Errors
    ///
    /// Returns [`StringArtError::InvalidParameter`] if the raster is too small
    /// to fit the board margin or too large, the pin count is too large, or
    /// no strings are requested.
    pub fn validate(&self) -> Result<()> {
        let minimum = 2 * BOARD_MARGIN as usize;
        if self.size <= minimum || self.size > MAX_SIZE {
            return Err(invalid_parameter(
                "size",
                &self.size,
                &format!("must be in {}..={MAX_SIZE} to fit the board margin", minimum + 1),
            ));
        }
        if self.pins > MAX_PINS {
            return Err(invalid_parameter(
                "pins",
                &self.pins,
                &format!("must not exceed {MAX_PINS}"),
            ));
        }
        if self.strings == 0 {
            return Err(invalid_parameter(
                "strings",
                &self.strings,
                &"must be positive",
            ));
        }
        Ok(())
    }

    /// Parameters of this invocation as a reusable preset
    pub fn to_preset(&self) -> Preset {
        Preset {
            pins: self.pins,
            strings: self.strings,
            min_dist: self.min_dist,
            fade: self.fade,
            width_px: DEFAULT_STROKE_WIDTH,
            alpha: self.alpha,
            color: DEFAULT_STROKE_COLOR.to_string(),
            board: DEFAULT_BOARD.to_string(),
        }
    }

    /// Build the worker request for a prepared raster
    pub fn run_request(&self, raster: Vec<u8>) -> RunRequest {
        RunRequest {
            size: self.size,
            fade: self.fade,
            min_dist: self.min_dist,
            max_steps: self.strings,
            raster,
            pins: self.pins,
        }
    }
}

/// Orchestrates batch processing of images with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process images according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if validation, loading, the run, or export fails
    pub fn process(&mut self) -> Result<()> {
        self.cli.validate()?;
        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        let worker = Worker::spawn()?;
        for (index, file) in files.iter().enumerate() {
            self.process_file(&worker, file, index)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    /// Whether a path looks like a source image rather than our own output
    pub fn is_source_image(path: &Path) -> bool {
        let extension_ok = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| {
                SOURCE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            });
        let is_output = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX));
        extension_ok && !is_output
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if !Self::is_source_image(target) {
                return Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"must be a supported image file",
                ));
            }
            if self.should_process_file(target) {
                Ok(vec![target.clone()])
            } else {
                Ok(vec![])
            }
        } else if target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(target).map_err(file_system(target, "read directory"))?
            {
                let path = entry.map_err(file_system(target, "read directory"))?.path();
                if Self::is_source_image(&path) && self.should_process_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"must be an image file or directory",
            ))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = Self::get_output_path(input_path, "csv");
        if output_path.exists() {
            // Allow print for user feedback for progress messages
            #[allow(clippy::print_stderr)]
            if !self.cli.quiet {
                eprintln!("Skipping: {} (output exists)", input_path.display());
            }
            false
        } else {
            true
        }
    }

    fn process_file(&mut self, worker: &Worker, input_path: &Path, index: usize) -> Result<()> {
        let start_time = Instant::now();

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_run(index, input_path, self.cli.strings);
        }

        let raster = load_raster(input_path, self.cli.size)?;
        worker.send(Request::Run(self.cli.run_request(raster)))?;

        let Some(result) = self.await_result(worker, index, start_time)? else {
            log::warn!("run for {} was canceled", input_path.display());
            return Ok(());
        };

        self.export(input_path, &result)?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_run(index, result.records.len(), start_time.elapsed());
        }

        Ok(())
    }

    fn await_result(
        &mut self,
        worker: &Worker,
        index: usize,
        start_time: Instant,
    ) -> Result<Option<ResultEvent>> {
        loop {
            match worker.recv()? {
                Event::Progress(progress) => {
                    if let Some(ref mut pm) = self.progress_manager {
                        pm.update_step(index, progress.step, start_time.elapsed());
                    }
                }
                Event::Result(result) => return Ok(Some(result)),
                Event::Status {
                    state: WorkerState::Canceled,
                } => return Ok(None),
                Event::Status { .. } => {}
                Event::Error { message } => {
                    return Err(StringArtError::RunFailed { reason: message });
                }
            }
        }
    }

    fn export(&self, input_path: &Path, result: &ResultEvent) -> Result<()> {
        export_csv(
            &result.records,
            &result.pins,
            &Self::get_output_path(input_path, "csv"),
        )?;

        if self.cli.svg {
            export_svg(
                result.size,
                &result.pins,
                &result.steps,
                &StrokeStyle::default(),
                &Self::get_output_path(input_path, "svg"),
            )?;
        }

        if self.cli.png {
            export_preview_png(
                result.size,
                &result.pins,
                &result.steps,
                self.cli.alpha,
                &Self::get_output_path(input_path, "png"),
            )?;
        }

        if self.cli.json {
            export_json(result, &Self::get_output_path(input_path, "json"))?;
        }

        if self.cli.preset {
            export_preset(
                &self.cli.to_preset(),
                &Self::get_output_path(input_path, "preset.json"),
            )?;
        }

        Ok(())
    }

    /// Output path next to the input: `<stem>_strings.<extension>`
    pub fn get_output_path(input_path: &Path, extension: &str) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!("{}{OUTPUT_SUFFIX}.{extension}", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }
}
