//! Tests for argument parsing, input discovery and batch processing

#[cfg(test)]
mod tests {
    use clap::Parser;
    use image::{GrayImage, Luma};
    use std::path::{Path, PathBuf};
    use stringloom::StringArtError;
    use stringloom::io::cli::{Cli, FileProcessor};
    use stringloom::io::configuration::{
        DEFAULT_BOARD, DEFAULT_PINS, DEFAULT_SIZE, DEFAULT_STRINGS, DEFAULT_STROKE_COLOR,
        DEFAULT_STROKE_WIDTH,
    };
    use stringloom::io::export::Preset;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stringloom").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    fn write_gradient(path: &Path, side: u32) {
        let image = GrayImage::from_fn(side, side, |x, y| Luma([((x + y) % 256) as u8]));
        image.save(path).expect("fixture image should be written");
    }

    // Tests defaults come from the configuration constants
    #[test]
    fn test_defaults() {
        let cli = parse(&["photo.png"]);
        assert_eq!(cli.target, PathBuf::from("photo.png"));
        assert_eq!(cli.pins, DEFAULT_PINS);
        assert_eq!(cli.strings, DEFAULT_STRINGS);
        assert_eq!(cli.size, DEFAULT_SIZE);
        assert!(cli.skip_existing());
        assert!(cli.should_show_progress());
        assert!(!cli.svg && !cli.png && !cli.json && !cli.preset);
    }

    // Tests short and long flags map onto run parameters
    #[test]
    fn test_flags() {
        let cli = parse(&[
            "dir", "-p", "64", "-s", "500", "-d", "4", "-f", "30", "-S", "256", "-q", "-n",
            "--svg", "--json",
        ]);
        assert_eq!(cli.pins, 64);
        assert_eq!(cli.strings, 500);
        assert_eq!(cli.min_dist, 4);
        assert_eq!(cli.fade, 30);
        assert_eq!(cli.size, 256);
        assert!(!cli.should_show_progress());
        assert!(!cli.skip_existing());
        assert!(cli.svg && cli.json && !cli.png);

        let request = cli.run_request(vec![0; 256 * 256]);
        assert_eq!(request.pins, 64);
        assert_eq!(request.max_steps, 500);
        assert_eq!(request.min_dist, 4);
    }

    // Tests rasters too small for the board margin are rejected
    #[test]
    fn test_validate() {
        assert!(parse(&["x.png", "-S", "33"]).validate().is_ok());
        assert!(matches!(
            parse(&["x.png", "-S", "32"]).validate(),
            Err(StringArtError::InvalidParameter {
                parameter: "size",
                ..
            })
        ));
        assert!(matches!(
            parse(&["x.png", "-S", "9000"]).validate(),
            Err(StringArtError::InvalidParameter {
                parameter: "size",
                ..
            })
        ));
        assert!(matches!(
            parse(&["x.png", "-p", "5000"]).validate(),
            Err(StringArtError::InvalidParameter {
                parameter: "pins",
                ..
            })
        ));
        assert!(matches!(
            parse(&["x.png", "-s", "0"]).validate(),
            Err(StringArtError::InvalidParameter {
                parameter: "strings",
                ..
            })
        ));
    }

    // Tests the preset mirrors the run flags and the drawing defaults
    #[test]
    fn test_preset_from_flags() {
        let cli = parse(&["x.png", "-p", "120", "-s", "900", "-d", "7", "-f", "40", "-a", "90"]);
        assert_eq!(
            cli.to_preset(),
            Preset {
                pins: 120,
                strings: 900,
                min_dist: 7,
                fade: 40,
                width_px: DEFAULT_STROKE_WIDTH,
                alpha: 90,
                color: DEFAULT_STROKE_COLOR.to_string(),
                board: DEFAULT_BOARD.to_string(),
            }
        );
    }

    // Tests source detection skips our own outputs
    // Verified by matching extensions case-sensitively
    #[test]
    fn test_is_source_image() {
        assert!(FileProcessor::is_source_image(Path::new("a/cat.png")));
        assert!(FileProcessor::is_source_image(Path::new("DOG.JPG")));
        assert!(!FileProcessor::is_source_image(Path::new("cat_strings.png")));
        assert!(!FileProcessor::is_source_image(Path::new("notes.txt")));
        assert!(!FileProcessor::is_source_image(Path::new("no_extension")));
    }

    // Tests output names sit next to the input
    #[test]
    fn test_get_output_path() {
        assert_eq!(
            FileProcessor::get_output_path(Path::new("in/cat.jpg"), "csv"),
            PathBuf::from("in/cat_strings.csv")
        );
        assert_eq!(
            FileProcessor::get_output_path(Path::new("cat.png"), "svg"),
            PathBuf::from("cat_strings.svg")
        );
    }

    // Tests a directory batch writes every requested export
    #[test]
    fn test_process_directory() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let dir = temp_dir.path();
        write_gradient(&dir.join("one.png"), 80);
        write_gradient(&dir.join("two.png"), 60);
        std::fs::write(dir.join("readme.txt"), "ignored").expect("text file should be written");

        let dir_arg = dir.to_string_lossy().to_string();
        let cli = parse(&[
            dir_arg.as_str(), "-S", "64", "-p", "16", "-s", "25", "-d", "2", "-q", "--svg", "--png",
            "--json", "--preset",
        ]);
        FileProcessor::new(cli)
            .process()
            .expect("batch should succeed");

        for stem in ["one", "two"] {
            for ext in ["csv", "svg", "png", "json", "preset.json"] {
                let output = dir.join(format!("{stem}_strings.{ext}"));
                assert!(output.exists(), "missing {}", output.display());
            }
            let csv = std::fs::read_to_string(dir.join(format!("{stem}_strings.csv")))
                .expect("csv should be readable");
            let rows = csv.lines().count();
            assert!((2..=26).contains(&rows));
        }
        assert!(!dir.join("readme_strings.csv").exists());

        let preset = std::fs::read_to_string(dir.join("one_strings.preset.json"))
            .expect("preset should be readable");
        let preset: Preset = serde_json::from_str(&preset).expect("preset should decode");
        assert_eq!(preset.pins, 16);
        assert_eq!(preset.min_dist, 2);
    }

    // Tests existing outputs are skipped unless forced
    #[test]
    fn test_skip_existing_output() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let input = temp_dir.path().join("cat.png");
        write_gradient(&input, 64);
        let csv_path = temp_dir.path().join("cat_strings.csv");
        std::fs::write(&csv_path, "sentinel").expect("sentinel should be written");

        let input_arg = input.to_string_lossy().to_string();
        FileProcessor::new(parse(&[input_arg.as_str(), "-S", "48", "-p", "12", "-s", "5", "-q"]))
            .process()
            .expect("skipped run should succeed");
        assert_eq!(
            std::fs::read_to_string(&csv_path).expect("csv should be readable"),
            "sentinel"
        );

        FileProcessor::new(parse(&[
            input_arg.as_str(), "-S", "48", "-p", "12", "-s", "5", "-q", "-n",
        ]))
        .process()
        .expect("forced run should succeed");
        let csv = std::fs::read_to_string(&csv_path).expect("csv should be readable");
        assert!(csv.starts_with("step,fromPin,toPin"));
    }

    // Tests a missing target is rejected before any work
    #[test]
    fn test_missing_target() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let missing = temp_dir.path().join("nothing_here");
        let missing_arg = missing.to_string_lossy().to_string();
        let result = FileProcessor::new(parse(&[missing_arg.as_str(), "-q"])).process();
        assert!(matches!(
            result,
            Err(StringArtError::InvalidParameter {
                parameter: "target",
                ..
            })
        ));
    }
}
