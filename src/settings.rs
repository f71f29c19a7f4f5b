use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat, Map};
use releases_core::UrlPolicy;
use releases_core::ics::DEFAULT_CALENDAR_NAME;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "RELEASES";

/// Resolved run settings.
///
/// Layered lowest to highest: defaults, `--config` file, `RELEASES_*`
/// environment variables, command-line flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// CSV listing of public data releases
    #[serde(default = "default_list_path")]
    pub list_path: PathBuf,

    /// Where the iCalendar file is written
    #[serde(default = "default_ical_path")]
    pub ical_path: PathBuf,

    /// Folder whose CSV listings are merged before converting
    #[serde(default)]
    pub merge_folder: Option<PathBuf>,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default)]
    pub url_policy: UrlPolicy,

    /// tracing filter directive used when neither --verbose nor --debug is set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_list_path() -> PathBuf {
    PathBuf::from("./releases.csv")
}

fn default_ical_path() -> PathBuf {
    PathBuf::from("./releases.ical")
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            list_path: default_list_path(),
            ical_path: default_ical_path(),
            merge_folder: None,
            calendar_name: default_calendar_name(),
            url_policy: UrlPolicy::default(),
            log_level: default_log_level(),
        }
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Default)]
pub struct Overrides {
    pub list_path: Option<PathBuf>,
    pub ical_path: Option<PathBuf>,
    pub merge_folder: Option<PathBuf>,
    pub calendar_name: Option<String>,
    pub lenient_urls: bool,
}

/// Load settings, reading the process environment.
pub fn load_settings(config_file: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    load_settings_from(config_file, None, overrides)
}

/// Load settings with an explicit environment map (`None` reads the
/// process environment).
fn load_settings_from(
    config_file: Option<&Path>,
    env: Option<Map<String, String>>,
    overrides: Overrides,
) -> Result<Settings> {
    let mut builder = Config::builder();

    if let Some(path) = config_file {
        if !path.exists() {
            anyhow::bail!("Config file not found at {}", path.display());
        }
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }

    builder = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .ignore_empty(true)
                .source(env),
        )
        .set_override_option("list_path", overrides.list_path.map(path_value))?
        .set_override_option("ical_path", overrides.ical_path.map(path_value))?
        .set_override_option("merge_folder", overrides.merge_folder.map(path_value))?
        .set_override_option("calendar_name", overrides.calendar_name)?;

    if overrides.lenient_urls {
        builder = builder.set_override("url_policy", "advisory")?;
    }

    let settings = builder
        .build()
        .context("Could not load settings")?
        .try_deserialize()
        .context("Invalid settings")?;

    Ok(settings)
}

fn path_value(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
