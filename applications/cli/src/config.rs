/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use volctl_filter::ElementKind;
use volctl_loudness::{EBU_R128_BROADCAST_LUFS, NEUTRAL_VOLUME};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "volctl.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    /// Factory name of the element to run
    #[serde(default = "default_element")]
    pub element: String,

    #[serde(default = "default_volume")]
    pub volume: f64,

    #[serde(default = "default_lufs")]
    pub integrated_loudness_lufs: f64,

    #[serde(default = "default_lufs")]
    pub target_level_lufs: f64,

    /// Sample format name, e.g. `F32LE`; case is ignored
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_rate")]
    pub rate: u32,

    #[serde(default = "default_channels")]
    pub channels: u32,

    /// Frames per pushed buffer
    #[serde(default = "default_buffer_frames")]
    pub buffer_frames: u32,
}

/// Values given on the command line; they win over file and environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub element: Option<String>,
    pub volume: Option<f64>,
    pub integrated_loudness_lufs: Option<f64>,
    pub target_level_lufs: Option<f64>,
    pub format: Option<String>,
    pub rate: Option<u32>,
    pub channels: Option<u32>,
    pub buffer_frames: Option<u32>,
}

fn default_element() -> String {
    "volume".to_string()
}

fn default_volume() -> f64 {
    NEUTRAL_VOLUME
}

fn default_lufs() -> f64 {
    EBU_R128_BROADCAST_LUFS
}

fn default_format() -> String {
    gst_audio::AUDIO_FORMAT_F32.to_str().to_string()
}

fn default_rate() -> u32 {
    48000
}

fn default_channels() -> u32 {
    2
}

fn default_buffer_frames() -> u32 {
    1024
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            element: default_element(),
            volume: default_volume(),
            integrated_loudness_lufs: default_lufs(),
            target_level_lufs: default_lufs(),
            format: default_format(),
            rate: default_rate(),
            channels: default_channels(),
            buffer_frames: default_buffer_frames(),
        }
    }
}

impl CliConfig {
    /// Load configuration from file, environment and command-line overrides
    ///
    /// An explicit `path` must exist; otherwise `volctl.toml` in the working
    /// directory is used when present. Environment variables are prefixed
    /// with `VOLCTL_` (e.g. `VOLCTL_TARGET_LEVEL_LUFS=-14`).
    pub fn load(path: Option<&Path>, overrides: &CliOverrides) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("VOLCTL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        settings = settings
            .set_override_option("element", overrides.element.clone())?
            .set_override_option("volume", overrides.volume)?
            .set_override_option(
                "integrated_loudness_lufs",
                overrides.integrated_loudness_lufs,
            )?
            .set_override_option("target_level_lufs", overrides.target_level_lufs)?
            .set_override_option("format", overrides.format.clone())?
            .set_override_option("rate", overrides.rate.map(i64::from))?
            .set_override_option("channels", overrides.channels.map(i64::from))?
            .set_override_option("buffer_frames", overrides.buffer_frames.map(i64::from))?;

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.buffer_frames == 0 {
            return Err(CliError::Config("buffer_frames must be at least 1".to_string()));
        }
        if self.channels == 0 {
            return Err(CliError::Config("channels must be at least 1".to_string()));
        }
        if self.rate == 0 {
            return Err(CliError::Config("rate must be at least 1".to_string()));
        }
        self.element_kind()?;
        self.audio_format()?;
        Ok(())
    }

    pub fn element_kind(&self) -> Result<ElementKind> {
        ElementKind::from_factory_name(&self.element)
            .ok_or_else(|| CliError::UnknownElement(self.element.clone()))
    }

    /// Parse `format`, accepting `F32`/`F64` for the native-endian float formats
    pub fn audio_format(&self) -> Result<gst_audio::AudioFormat> {
        let name = self.format.trim().to_ascii_uppercase();
        let format = match name.as_str() {
            "F32" => gst_audio::AUDIO_FORMAT_F32,
            "F64" => gst_audio::AUDIO_FORMAT_F64,
            other => gst_audio::AudioFormat::from_string(other),
        };
        match format {
            gst_audio::AudioFormat::Unknown | gst_audio::AudioFormat::Encoded => {
                Err(CliError::UnknownFormat(self.format.clone()))
            }
            format => Ok(format),
        }
    }

    pub fn audio_info(&self) -> Result<gst_audio::AudioInfo> {
        let info = gst_audio::AudioInfo::builder(self.audio_format()?, self.rate, self.channels)
            .build()?;
        Ok(info)
    }

    /// Bytes in one pushed buffer
    pub fn buffer_bytes(&self) -> Result<usize> {
        Ok(self.audio_info()?.bpf() as usize * self.buffer_frames as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        gst::init().unwrap();
        let config = CliConfig::default();
        assert_eq!(config.element_kind().unwrap(), ElementKind::Volume);
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.target_level_lufs, -23.0);
        assert_eq!(config.audio_format().unwrap(), gst_audio::AUDIO_FORMAT_F32);
        assert_eq!(config.buffer_bytes().unwrap(), 1024 * 2 * 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = CliConfig {
            buffer_frames: 0,
            ..CliConfig::default()
        };
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        let config = CliConfig {
            channels: 0,
            ..CliConfig::default()
        };
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        let config = CliConfig {
            element: "reverb".into(),
            ..CliConfig::default()
        };
        assert!(matches!(config.validate(), Err(CliError::UnknownElement(_))));

        let config = CliConfig {
            format: "mp3".into(),
            ..CliConfig::default()
        };
        assert!(matches!(config.validate(), Err(CliError::UnknownFormat(_))));
    }

    #[test]
    fn test_format_names_ignore_case() {
        for (name, expected) in [
            ("f32le", gst_audio::AudioFormat::F32le),
            ("F64be", gst_audio::AudioFormat::F64be),
            ("s16LE", gst_audio::AudioFormat::S16le),
            ("f64", gst_audio::AUDIO_FORMAT_F64),
        ] {
            let config = CliConfig {
                format: name.into(),
                ..CliConfig::default()
            };
            assert_eq!(config.audio_format().unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn test_load_file_with_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "element = \"ebur128control\"\nintegrated_loudness_lufs = -12.0\nformat = \"F64LE\"\nchannels = 1"
        )
        .unwrap();

        let overrides = CliOverrides {
            target_level_lufs: Some(-14.0),
            buffer_frames: Some(256),
            ..CliOverrides::default()
        };
        let config = CliConfig::load(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.element_kind().unwrap(), ElementKind::Ebur128Control);
        assert_eq!(config.integrated_loudness_lufs, -12.0);
        assert_eq!(config.target_level_lufs, -14.0);
        assert_eq!(config.audio_format().unwrap(), gst_audio::AudioFormat::F64le);
        assert_eq!(config.channels, 1);
        assert_eq!(config.buffer_frames, 256);
        assert_eq!(config.volume, 1.0);
    }

    #[test]
    fn test_load_lowercase_format_override() {
        let overrides = CliOverrides {
            format: Some("f64le".into()),
            ..CliOverrides::default()
        };
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let config = CliConfig::load(Some(file.path()), &overrides).unwrap();
        gst::init().unwrap();
        assert_eq!(config.audio_format().unwrap(), gst_audio::AudioFormat::F64le);
        assert_eq!(config.buffer_bytes().unwrap(), 1024 * 2 * 8);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = CliConfig::load(
            Some(Path::new("/nonexistent/volctl.toml")),
            &CliOverrides::default(),
        );
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
