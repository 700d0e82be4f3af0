use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    #[strum(serialize = "palette")]
    Palette,
    #[strum(serialize = "active", serialize = "from_active", serialize = "object")]
    #[serde(rename = "active")]
    ActiveObject,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceMode,
    /// No material is selected closer than this to the origin.
    pub interaction_radius: f64,
    pub mat_centers_radius: f64,
    pub mat_radius: f64,
    pub selected_radius: f64,
    pub brush_radius: f64,
    pub brush_interrad: f64,
    /// Radius of the ring carrying the brushes of the selected material.
    pub overall_brush_radius: f64,
    pub tex_radius: f64,
    pub mark_radius: f64,
    pub use_default_brushes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceMode::Palette,
            interaction_radius: 40.0,
            mat_centers_radius: 100.0,
            mat_radius: 20.0,
            selected_radius: 26.0,
            brush_radius: 14.0,
            brush_interrad: 6.0,
            overall_brush_radius: 190.0,
            tex_radius: 60.0,
            mark_radius: 8.0,
            use_default_brushes: true,
        }
    }
}

impl Settings {
    pub fn from_palette(&self) -> bool {
        self.source == SourceMode::Palette
    }

    pub fn brush_band(&self) -> f64 {
        self.brush_radius + 0.5 * self.brush_interrad
    }

    /// Scale between stored pick-line origins and pixels.
    pub fn pickline_scale(&self) -> f64 {
        self.mat_centers_radius - self.mat_radius
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let radii = [
            ("interaction_radius", self.interaction_radius),
            ("mat_centers_radius", self.mat_centers_radius),
            ("mat_radius", self.mat_radius),
            ("brush_radius", self.brush_radius),
            ("overall_brush_radius", self.overall_brush_radius),
            ("tex_radius", self.tex_radius),
            ("mark_radius", self.mark_radius),
        ];
        if let Some((name, _)) = radii.iter().find(|(_, r)| !r.is_finite() || *r <= 0.0) {
            return Err(ConfigError::Invalid(format!("{name} must be positive")));
        }
        if self.pickline_scale() <= 0.0 {
            return Err(ConfigError::Invalid(
                "mat_radius must be smaller than mat_centers_radius".to_string(),
            ));
        }
        if self.overall_brush_radius - self.brush_band() <= self.interaction_radius {
            return Err(ConfigError::Invalid(
                "brush ring overlaps the interaction dead zone".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "gpcolorpicker", "gpcolorpicker")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Settings, ConfigError> {
    let settings: Settings = builder
        .add_source(config::Environment::with_prefix("GPCP"))
        .build()?
        .try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_config() -> Result<Settings, ConfigError> {
    let config_path = get_config_path()?;
    build(config::Config::builder().add_source(config::File::from(config_path).required(false)))
}

pub fn load_from_str(toml: &str) -> Result<Settings, ConfigError> {
    build(
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
    )
}

pub fn load_or_default() -> Settings {
    match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Could not load settings, running with default values: {}", e);
            Settings::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
