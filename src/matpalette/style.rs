use palette::{LinSrgb, LinSrgba, Srgb};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

pub type Rgba = LinSrgba<f32>;

pub fn transparent() -> Rgba {
    LinSrgba::new(0.0, 0.0, 0.0, 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, StrumDisplay)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum FillStyle {
    #[default]
    Solid,
    Gradient,
    Texture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, StrumDisplay)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Texture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, StrumDisplay)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum LineMode {
    #[default]
    Line,
    Dots,
    Box,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, StrumDisplay)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AlignmentMode {
    #[default]
    Path,
    Object,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, StrumDisplay)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialStyle {
    pub color: Rgba,
    pub fill_color: Rgba,
    pub mix_color: Rgba,
    pub show_stroke: bool,
    pub show_fill: bool,
    pub stroke_style: StrokeStyle,
    pub fill_style: FillStyle,
    pub mode: LineMode,
    pub alignment_mode: AlignmentMode,
    pub alignment_rotation: f64,
    pub gradient_type: GradientType,
    pub flip: bool,
    pub ghost: bool,
    pub hide: bool,
    pub lock: bool,
    pub mix_factor: f64,
    pub mix_stroke_factor: f64,
    pub pass_index: i64,
    pub pixel_size: f64,
    pub use_fill_holdout: bool,
    pub use_overlap_strokes: bool,
    pub use_stroke_holdout: bool,
}

impl Default for MaterialStyle {
    fn default() -> Self {
        Self {
            color: LinSrgba::new(0.0, 0.0, 0.0, 1.0),
            fill_color: LinSrgba::new(0.5, 0.5, 0.5, 1.0),
            mix_color: LinSrgba::new(1.0, 1.0, 1.0, 0.2),
            show_stroke: true,
            show_fill: false,
            stroke_style: StrokeStyle::default(),
            fill_style: FillStyle::default(),
            mode: LineMode::default(),
            alignment_mode: AlignmentMode::default(),
            alignment_rotation: 0.0,
            gradient_type: GradientType::default(),
            flip: false,
            ghost: false,
            hide: false,
            lock: false,
            mix_factor: 0.0,
            mix_stroke_factor: 0.0,
            pass_index: 0,
            pixel_size: 1.0,
            use_fill_holdout: false,
            use_overlap_strokes: false,
            use_stroke_holdout: false,
        }
    }
}

impl MaterialStyle {
    pub fn solid(stroke: Rgba, fill: Rgba) -> Self {
        Self {
            color: stroke,
            fill_color: fill,
            show_fill: true,
            ..Self::default()
        }
    }

    pub fn stroke_rgba(&self) -> Rgba {
        if self.show_stroke { self.color } else { transparent() }
    }

    pub fn fill_rgba(&self) -> Rgba {
        if self.show_fill { self.fill_color } else { transparent() }
    }

    pub fn is_flat(&self) -> bool {
        self.fill_style == FillStyle::Solid && self.stroke_style == StrokeStyle::Solid
    }

    /// Sets an attribute by name. Returns `Ok(false)` for names outside the table.
    pub fn apply(&mut self, name: &str, value: &Value) -> Result<bool, AttributeError> {
        match find_attribute(name) {
            Some(attr) => (attr.set)(self, value).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn to_attributes(&self) -> Map<String, Value> {
        MATERIAL_ATTRIBUTES
            .iter()
            .map(|attr| (attr.name.to_string(), (attr.get)(self)))
            .collect()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AttributeError {
    #[error("expected {0}")]
    Expected(&'static str),
    #[error("invalid hex color: {0}")]
    Hex(String),
}

pub struct MaterialAttribute {
    pub name: &'static str,
    set: fn(&mut MaterialStyle, &Value) -> Result<(), AttributeError>,
    get: fn(&MaterialStyle) -> Value,
}

macro_rules! attribute {
    ($field:ident, $parse:path, $emit:path) => {
        MaterialAttribute {
            name: stringify!($field),
            set: |style, value| {
                style.$field = $parse(value)?;
                Ok(())
            },
            get: |style| $emit(&style.$field),
        }
    };
}

pub static MATERIAL_ATTRIBUTES: &[MaterialAttribute] = &[
    attribute!(alignment_mode, parse_enum, emit_display),
    attribute!(alignment_rotation, parse_f64, emit_f64),
    attribute!(color, parse_color, emit_color),
    attribute!(fill_color, parse_color, emit_color),
    attribute!(fill_style, parse_enum, emit_display),
    attribute!(flip, parse_bool, emit_bool),
    attribute!(ghost, parse_bool, emit_bool),
    attribute!(gradient_type, parse_enum, emit_display),
    attribute!(hide, parse_bool, emit_bool),
    attribute!(lock, parse_bool, emit_bool),
    attribute!(mix_color, parse_color, emit_color),
    attribute!(mix_factor, parse_f64, emit_f64),
    attribute!(mix_stroke_factor, parse_f64, emit_f64),
    attribute!(mode, parse_enum, emit_display),
    attribute!(pass_index, parse_i64, emit_i64),
    attribute!(pixel_size, parse_f64, emit_f64),
    attribute!(show_fill, parse_bool, emit_bool),
    attribute!(show_stroke, parse_bool, emit_bool),
    attribute!(stroke_style, parse_enum, emit_display),
    attribute!(use_fill_holdout, parse_bool, emit_bool),
    attribute!(use_overlap_strokes, parse_bool, emit_bool),
    attribute!(use_stroke_holdout, parse_bool, emit_bool),
];

pub fn find_attribute(name: &str) -> Option<&'static MaterialAttribute> {
    MATERIAL_ATTRIBUTES.iter().find(|attr| attr.name == name)
}

fn parse_bool(value: &Value) -> Result<bool, AttributeError> {
    value.as_bool().ok_or(AttributeError::Expected("a boolean"))
}

fn parse_f64(value: &Value) -> Result<f64, AttributeError> {
    value.as_f64().ok_or(AttributeError::Expected("a number"))
}

fn parse_i64(value: &Value) -> Result<i64, AttributeError> {
    value.as_i64().ok_or(AttributeError::Expected("an integer"))
}

fn parse_enum<T: FromStr>(value: &Value) -> Result<T, AttributeError> {
    value
        .as_str()
        .and_then(|s| T::from_str(s).ok())
        .ok_or(AttributeError::Expected("a known enum identifier"))
}

/// Accepts `["#rrggbb", alpha]` (sRGB) or `[r, g, b, a]` (linear).
fn parse_color(value: &Value) -> Result<Rgba, AttributeError> {
    let items = value
        .as_array()
        .ok_or(AttributeError::Expected("a color array"))?;

    match items.as_slice() {
        [Value::String(hex), alpha] => {
            let alpha = alpha
                .as_f64()
                .ok_or(AttributeError::Expected("a numeric alpha"))?;
            hex_to_linear(hex, alpha as f32)
        }
        [r, g, b, a] => {
            let c: Vec<f32> = [r, g, b, a]
                .iter()
                .map(|v| v.as_f64().map(|f| f as f32))
                .collect::<Option<_>>()
                .ok_or(AttributeError::Expected("four numeric components"))?;
            Ok(LinSrgba::new(c[0], c[1], c[2], c[3]))
        }
        _ => Err(AttributeError::Expected("a color array")),
    }
}

pub fn hex_to_linear(hex: &str, alpha: f32) -> Result<Rgba, AttributeError> {
    let srgb = Srgb::<u8>::from_str(hex.trim()).map_err(|e| AttributeError::Hex(e.to_string()))?;
    let linear: LinSrgb<f32> = srgb.into_format::<f32>().into_linear();
    Ok(LinSrgba::new(linear.red, linear.green, linear.blue, alpha))
}

fn emit_bool(value: &bool) -> Value {
    Value::from(*value)
}

fn emit_f64(value: &f64) -> Value {
    Value::from(*value)
}

fn emit_i64(value: &i64) -> Value {
    Value::from(*value)
}

fn emit_display<T: Display>(value: &T) -> Value {
    Value::from(value.to_string())
}

fn emit_color(value: &Rgba) -> Value {
    Value::from(vec![
        f64::from(value.red),
        f64::from(value.green),
        f64::from(value.blue),
        f64::from(value.alpha),
    ])
}
