//! Material positions are stored in degrees; everything in memory is radians.

use crate::geometry::{degrees_to_radians, radians_to_degrees};
use crate::matpalette::collection::PaletteCollection;
use crate::matpalette::model::{LayerName, MaterialItem, MaterialName, Palette, PaletteError, PaletteName};
use crate::matpalette::style::{AttributeError, MaterialStyle};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaletteIoError {
    #[error("Palette file not found: {0}")]
    NotFound(PathBuf),
    #[error("{0} is not a json file")]
    NotJson(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed palette file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected {expected} for '{context}'")]
    Format {
        context: String,
        expected: &'static str,
    },
    #[error("Invalid attribute '{attribute}' of material '{material}': {source}")]
    Attribute {
        material: MaterialName,
        attribute: String,
        #[source]
        source: AttributeError,
    },
    #[error("No materials in palette '{0}'")]
    NoMaterials(PaletteName),
    #[error("Palette '{0}' has no source file")]
    NoSource(PaletteName),
    #[error(transparent)]
    Palette(#[from] PaletteError),
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<PaletteName>,
    pub failed: Vec<(PaletteName, PaletteIoError)>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn import_file(
    path: &Path,
    only: &[PaletteName],
    collection: &mut PaletteCollection,
) -> Result<ImportReport, PaletteIoError> {
    if !path.is_file() {
        return Err(PaletteIoError::NotFound(path.to_path_buf()));
    }
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(PaletteIoError::NotJson(path.to_path_buf()));
    }

    let text = fs_err::read_to_string(path)?;
    let report = import_str(&text, path, only, collection)?;

    let timestamp = fs_err::metadata(path).and_then(|m| m.modified()).ok();
    for name in &report.imported {
        if let Some(palette) = collection.index_of(name).and_then(|i| collection.get_mut(i)) {
            palette.timestamp = timestamp;
            palette.set_obsolete(false);
        }
    }
    Ok(report)
}

/// Each palette is built completely before it replaces anything in the collection.
pub fn import_str(
    text: &str,
    source: &Path,
    only: &[PaletteName],
    collection: &mut PaletteCollection,
) -> Result<ImportReport, PaletteIoError> {
    let document: Value = serde_json::from_str(text)?;
    let entries = document.as_object().ok_or_else(|| PaletteIoError::Format {
        context: source.display().to_string(),
        expected: "an object of palettes",
    })?;

    let mut report = ImportReport::default();
    for (name, data) in entries {
        let name = PaletteName::new(name.as_str());
        if !only.is_empty() && !only.contains(&name) {
            continue;
        }

        match build_palette(&name, data, source) {
            Ok(mut palette) => {
                if let Some(existing) = collection.by_name(&name) {
                    palette.set_visible(existing.is_visible());
                }
                let index = collection.insert_palette(palette);
                collection.set_active_index(Some(index))?;
                log::info!("Imported palette '{}'", name);
                report.imported.push(name);
            }
            Err(e) => {
                log::error!("Failed to import palette '{}': {}", name, e);
                report.failed.push((name, e));
            }
        }
    }
    Ok(report)
}

fn build_palette(name: &PaletteName, data: &Value, source: &Path) -> Result<Palette, PaletteIoError> {
    let data = data.as_object().ok_or_else(|| PaletteIoError::Format {
        context: name.to_string(),
        expected: "an object",
    })?;

    let mut palette = Palette::new(name.clone());
    palette.source_path = Some(source.to_path_buf());

    let mut base_dir = PathBuf::new();
    if let Some(image) = data.get("image").and_then(Value::as_object)
        && let Some(path) = image.get("path").and_then(Value::as_str)
    {
        if image.get("relative").and_then(Value::as_bool).unwrap_or(false) {
            base_dir = source.parent().map(Path::to_path_buf).unwrap_or_default();
        }
        palette.image = Some(base_dir.join(path));
    }

    let materials = data
        .get("materials")
        .and_then(Value::as_object)
        .ok_or_else(|| PaletteIoError::Format {
            context: format!("{name}.materials"),
            expected: "an object",
        })?;

    let has_image = palette.image.is_some();
    for (material_name, material_data) in materials {
        let item = build_material(material_name, material_data, &base_dir, has_image)?;
        palette.set_material(item, None);
    }

    if palette.count() == 0 {
        return Err(PaletteIoError::NoMaterials(name.clone()));
    }
    Ok(palette)
}

fn build_material(
    name: &str,
    data: &Value,
    base_dir: &Path,
    has_image: bool,
) -> Result<MaterialItem, PaletteIoError> {
    let name = MaterialName::new(name);
    let data = data.as_object().ok_or_else(|| PaletteIoError::Format {
        context: name.to_string(),
        expected: "an object",
    })?;

    let mut item = MaterialItem::new(name.clone(), MaterialStyle::default());
    for (key, value) in data {
        match key.as_str() {
            "position" => {
                let degrees = value.as_f64().ok_or_else(|| PaletteIoError::Format {
                    context: format!("{name}.position"),
                    expected: "a number of degrees",
                })?;
                item.set_angle(degrees_to_radians(degrees), false);
            }
            "image" => {
                // material images only make sense on top of a palette image
                if has_image && let Some(path) = value.as_str() {
                    item.image = Some(base_dir.join(path));
                }
            }
            "layer" => item.layer = value.as_str().map(LayerName::new),
            _ => match item.style.apply(key, value) {
                Ok(true) => {}
                Ok(false) => log::warn!("Ignoring attribute '{}' of material '{}'", key, name),
                Err(source) => {
                    return Err(PaletteIoError::Attribute {
                        material: name,
                        attribute: key.clone(),
                        source,
                    });
                }
            },
        }
    }
    Ok(item)
}

pub fn export_value(collection: &PaletteCollection) -> Value {
    let palettes: Map<String, Value> = collection
        .palettes()
        .map(|palette| (palette.name.to_string(), export_palette(palette)))
        .collect();
    Value::Object(palettes)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn export_palette(palette: &Palette) -> Value {
    let mut data = Map::new();
    if let Some(image) = &palette.image {
        data.insert(
            "image".to_string(),
            json!({ "path": file_name(image), "relative": true }),
        );
    }

    let materials: Map<String, Value> = palette
        .materials()
        .iter()
        .map(|m| {
            let mut attributes = m.style.to_attributes();
            if let Some(angle) = m.angle().custom() {
                attributes.insert("position".to_string(), json!(radians_to_degrees(angle)));
            }
            if let Some(image) = &m.image {
                attributes.insert("image".to_string(), json!(file_name(image)));
            }
            if let Some(layer) = &m.layer {
                attributes.insert("layer".to_string(), json!(layer.as_str()));
            }
            (m.name.to_string(), Value::Object(attributes))
        })
        .collect();
    data.insert("materials".to_string(), Value::Object(materials));

    Value::Object(data)
}

pub fn export_file(collection: &PaletteCollection, path: &Path) -> Result<(), PaletteIoError> {
    let text = serde_json::to_string_pretty(&export_value(collection))?;
    fs_err::write(path, text)?;
    Ok(())
}

pub fn reload_palette(
    collection: &mut PaletteCollection,
    index: usize,
) -> Result<ImportReport, PaletteIoError> {
    let palette = collection.get(index).ok_or(PaletteError::PaletteIndex(index))?;
    let name = palette.name.clone();
    let source = palette
        .source_path
        .clone()
        .ok_or_else(|| PaletteIoError::NoSource(name.clone()))?;

    import_file(&source, &[name], collection)
}

/// Flags palettes whose source file changed after they were imported. Returns the
/// number of obsolete palettes.
pub fn check_obsolete(collection: &mut PaletteCollection) -> usize {
    let mut count = 0;
    for index in 0..collection.count() {
        let Some(palette) = collection.get_mut(index) else {
            continue;
        };
        let (Some(source), Some(imported)) = (&palette.source_path, palette.timestamp) else {
            continue;
        };
        let modified = fs_err::metadata(source).and_then(|m| m.modified()).ok();
        if modified.is_some_and(|m| m > imported) {
            log::info!("Palette '{}' has a newer version on disk", palette.name);
            palette.set_obsolete(true);
        }
        if palette.is_obsolete() {
            count += 1;
        }
    }
    count
}
