use crate::codec::CodecOptions;

/// Threshold applied when one is requested without a usable size.
pub const DEFAULT_THRESHOLD: u64 = 150;

/// Minimum contents size required before compression is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Threshold {
    /// Every unit is compressed regardless of size.
    #[default]
    Disabled,
    /// Units smaller than this many bytes pass through uncompressed.
    MinSize(u64),
}

impl Threshold {
    /// Threshold of `bytes`, floored at one byte.
    pub fn min_size(bytes: u64) -> Self {
        Threshold::MinSize(bytes.max(1))
    }

    /// Resolves a human-readable size such as `"1kb"` or `"2MB"`.
    ///
    /// Sizes that cannot be parsed fall back to [`DEFAULT_THRESHOLD`].
    pub fn parse(size: &str) -> Self {
        Threshold::min_size(parse_size(size).unwrap_or(DEFAULT_THRESHOLD))
    }

    /// Decides whether contents of `len` bytes should be compressed.
    pub fn should_compress(self, len: u64) -> bool {
        match self {
            Threshold::Disabled => true,
            Threshold::MinSize(min) => len >= min,
        }
    }

    /// Returns `true` when a minimum size is in effect.
    pub fn is_enabled(self) -> bool {
        self != Threshold::Disabled
    }
}

impl From<u64> for Threshold {
    fn from(bytes: u64) -> Self {
        Threshold::min_size(bytes)
    }
}

impl From<&str> for Threshold {
    fn from(size: &str) -> Self {
        Threshold::parse(size)
    }
}

impl From<bool> for Threshold {
    fn from(enabled: bool) -> Self {
        if enabled {
            Threshold::MinSize(DEFAULT_THRESHOLD)
        } else {
            Threshold::Disabled
        }
    }
}

/// Parses a size string (e.g. "1kb", "100M", "512") to a byte count.
fn parse_size(size: &str) -> Option<u64> {
    let size = size.trim().to_uppercase();

    // Plain numbers are byte counts.
    if let Ok(num) = size.parse::<u64>() {
        return Some(num);
    }

    let split_pos = size.chars().position(|c| !c.is_ascii_digit())?;
    let (num_str, suffix) = size.split_at(split_pos);
    let num: u64 = num_str.parse().ok()?;

    let multiplier: u64 = match suffix.trim() {
        "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        "T" | "TB" => 1024 * 1024 * 1024 * 1024,
        _ => return None,
    };

    num.checked_mul(multiplier)
}

/// Configuration for one compression stage.
///
/// Built once, then shared read-only across every unit the stage processes.
/// The format is kept as the configured name and validated against the
/// supported set per unit, so a bad name surfaces on the error channel
/// instead of at construction.
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// Name of the target format: `gzip`, `deflate` or `zlib`.
    pub format: String,
    /// Whether the format suffix is appended to the path after compressing.
    pub append: bool,
    /// Size gate deciding when compression is worthwhile.
    pub threshold: Threshold,
    /// Options handed through to the codec untouched.
    pub codec_options: CodecOptions,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            format: "gzip".to_owned(),
            append: true,
            threshold: Threshold::Disabled,
            codec_options: CodecOptions::default(),
        }
    }
}

impl CompressionConfig {
    /// Creates the default configuration: gzip, suffix appended, no
    /// threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target format name.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets whether the format suffix is appended after compressing.
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Sets the size threshold.
    ///
    /// Accepts a [`Threshold`], a byte count, a size string such as `"1kb"`,
    /// or a bool enabling the default threshold.
    pub fn threshold(mut self, threshold: impl Into<Threshold>) -> Self {
        self.threshold = threshold.into();
        self
    }

    /// Sets the codec pass-through options.
    pub fn codec_options(mut self, options: CodecOptions) -> Self {
        self.codec_options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompressionConfig::default();
        assert_eq!(config.format, "gzip");
        assert!(config.append);
        assert_eq!(config.threshold, Threshold::Disabled);
    }

    #[test]
    fn test_builder_overrides() {
        let config = CompressionConfig::new()
            .format("zlib")
            .append(false)
            .threshold(1024u64);
        assert_eq!(config.format, "zlib");
        assert!(!config.append);
        assert_eq!(config.threshold, Threshold::MinSize(1024));
    }

    #[test]
    fn test_threshold_from_bool() {
        assert_eq!(Threshold::from(false), Threshold::Disabled);
        assert_eq!(Threshold::from(true), Threshold::MinSize(DEFAULT_THRESHOLD));

        assert!(!Threshold::from(false).is_enabled());
        assert!(Threshold::from(true).is_enabled());
    }

    #[test]
    fn test_threshold_floors_at_one() {
        assert_eq!(Threshold::min_size(0), Threshold::MinSize(1));
        assert_eq!(Threshold::min_size(1), Threshold::MinSize(1));
    }

    #[test]
    fn test_threshold_from_size_string() {
        assert_eq!(Threshold::from("1kb"), Threshold::MinSize(1024));
        assert_eq!(Threshold::from("2MB"), Threshold::MinSize(2 * 1024 * 1024));
        assert_eq!(Threshold::from("512"), Threshold::MinSize(512));
    }

    #[test]
    fn test_threshold_falls_back_on_garbage() {
        assert_eq!(
            Threshold::from("not a size"),
            Threshold::MinSize(DEFAULT_THRESHOLD)
        );
        assert_eq!(Threshold::from(""), Threshold::MinSize(DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_should_compress_boundary() {
        let threshold = Threshold::MinSize(10);
        assert!(!threshold.should_compress(9));
        assert!(threshold.should_compress(10));
        assert!(threshold.should_compress(11));

        assert!(Threshold::Disabled.should_compress(0));
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024"), Some(1024));
        assert_eq!(parse_size("1K"), Some(1024));
        assert_eq!(parse_size("1KB"), Some(1024));
        assert_eq!(parse_size("1kb"), Some(1024));
        assert_eq!(parse_size("1M"), Some(1024 * 1024));
        assert_eq!(parse_size("3GB"), Some(3 * 1024 * 1024 * 1024));
        assert_eq!(parse_size("10B"), Some(10));
        assert_eq!(parse_size("1X"), None);
        assert_eq!(parse_size("1.5KB"), None);
        assert_eq!(parse_size(""), None);
    }
}
