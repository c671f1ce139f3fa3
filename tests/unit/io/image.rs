//! Tests for raster preparation and preview rendering

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage, Luma, RgbImage};
    use stringloom::StringArtError;
    use stringloom::io::image::{export_preview_png, load_raster, prepare_raster, render_path};
    use stringloom::spatial::pins::generate_pins;
    use tempfile::TempDir;

    // Tests a non-square color image becomes a square grayscale raster
    #[test]
    fn test_prepare_raster_shape() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(120, 80));
        let raster = prepare_raster(&image, 64);
        assert_eq!(raster.len(), 64 * 64);
    }

    // Tests the outside of the board circle is painted white
    // Verified by skipping the circular mask
    #[test]
    fn test_prepare_raster_masks_corners() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(100, 100));
        let raster = prepare_raster(&image, 64);

        assert_eq!(raster.first(), Some(&u8::MAX));
        assert_eq!(raster.last(), Some(&u8::MAX));
        assert_eq!(raster.get(32 * 64 + 32), Some(&0));
    }

    // Tests an empty image yields an all-white raster
    #[test]
    fn test_prepare_raster_empty_image() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let raster = prepare_raster(&image, 16);
        assert_eq!(raster.len(), 256);
        assert!(raster.iter().all(|&v| v == u8::MAX));
    }

    // Tests chords darken only the pixels they cross
    #[test]
    fn test_render_path() {
        let pins = generate_pins(100, 8);
        let image = render_path(100, &pins, &[0, 4], u8::MAX);

        assert_eq!(image.dimensions(), (100, 100));
        assert_eq!(image.get_pixel(50, 50), &Luma([0]));
        assert_eq!(image.get_pixel(50, 10), &Luma([u8::MAX]));
    }

    // Tests overlapping strings accumulate tone
    #[test]
    fn test_render_path_accumulates() {
        let pins = generate_pins(100, 8);
        let once = render_path(100, &pins, &[0, 4], 100);
        let twice = render_path(100, &pins, &[0, 4, 0], 100);

        let single = once.get_pixel(50, 50).0[0];
        let double = twice.get_pixel(50, 50).0[0];
        assert!(single < u8::MAX);
        assert!(double < single);
    }

    // Tests a preview round-trips through a PNG file and back into a raster
    #[test]
    fn test_export_and_load() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = temp_dir.path().join("preview").join("board.png");
        let pins = generate_pins(80, 12);

        export_preview_png(80, &pins, &[0, 6, 3], 200, &path).expect("png should be written");
        assert!(path.exists());

        let raster = load_raster(&path, 40).expect("png should load");
        assert_eq!(raster.len(), 40 * 40);
    }

    // Tests missing files report the offending path
    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = temp_dir.path().join("absent.png");

        match load_raster(&path, 32) {
            Err(StringArtError::ImageLoad { path: reported, .. }) => assert_eq!(reported, path),
            other => unreachable!("expected ImageLoad error, got {other:?}"),
        }
    }
}
