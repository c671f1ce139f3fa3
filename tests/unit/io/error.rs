//! Tests for error display and source chaining

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::path::PathBuf;
    use stringloom::StringArtError;
    use stringloom::io::error::{invalid_parameter, unsupported_raster};

    // Tests invalid parameters name the parameter, value and reason
    #[test]
    fn test_invalid_parameter_display() {
        let err = invalid_parameter("size", &0, &"must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'size' = '0': must be positive"
        );
        assert!(err.source().is_none());
    }

    // Tests raster errors carry their reason
    #[test]
    fn test_unsupported_raster_display() {
        let err = unsupported_raster(&"expected 16 bytes");
        assert!(matches!(err, StringArtError::UnsupportedRaster { .. }));
        assert_eq!(err.to_string(), "Unsupported raster input: expected 16 bytes");
    }

    // Tests I/O errors convert and keep their source
    #[test]
    fn test_io_error_conversion() {
        let err = StringArtError::from(std::io::Error::other("disk full"));
        let StringArtError::FileSystem { ref path, .. } = err else {
            unreachable!("expected FileSystem error type");
        };
        assert_eq!(path, &PathBuf::from("<unknown>"));
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("disk full".to_string())
        );
    }

    // Tests JSON errors convert into serialization errors
    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").expect_err("invalid JSON");
        let err = StringArtError::from(json_err);
        assert!(matches!(err, StringArtError::Serialization { .. }));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to serialize message"));
    }

    // Tests worker-side failures display plainly
    #[test]
    fn test_worker_errors_display() {
        assert_eq!(
            StringArtError::WorkerDisconnected.to_string(),
            "Worker thread disconnected"
        );
        let failed = StringArtError::RunFailed {
            reason: "bad raster".to_string(),
        };
        assert_eq!(failed.to_string(), "Run failed: bad raster");
    }
}
