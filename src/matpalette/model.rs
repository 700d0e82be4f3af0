use crate::geometry::Point;
use crate::matpalette::alloc::allocate_angles;
use crate::matpalette::style::MaterialStyle;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct MaterialName(String);

crate::impl_string_newtype!(MaterialName);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct BrushName(String);

crate::impl_string_newtype!(BrushName);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct PaletteName(String);

crate::impl_string_newtype!(PaletteName);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct LayerName(String);

crate::impl_string_newtype!(LayerName);

#[derive(Debug, Error, PartialEq)]
pub enum PaletteError {
    #[error("Palette name is empty")]
    EmptyName,
    #[error("Palette '{0}' already exists")]
    DuplicatePalette(PaletteName),
    #[error("No palette at index {0}")]
    PaletteIndex(usize),
    #[error("Material '{0}' is not in the palette")]
    UnknownMaterial(MaterialName),
    #[error("No material at index {0}")]
    MaterialIndex(usize),
}

/// Position of a material on the wheel, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ItemAngle {
    #[default]
    Unset,
    Auto(f64),
    Custom(f64),
}

impl ItemAngle {
    pub fn value(&self) -> Option<f64> {
        match *self {
            Self::Unset => None,
            Self::Auto(a) | Self::Custom(a) => Some(a),
        }
    }

    pub fn custom(&self) -> Option<f64> {
        match *self {
            Self::Custom(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrushItem {
    pub name: BrushName,
    pub index: usize,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialItem {
    pub name: MaterialName,
    pub style: MaterialStyle,
    pub image: Option<PathBuf>,
    pub layer: Option<LayerName>,
    pub brushes: Vec<BrushItem>,
    pub pending_brush: Option<BrushName>,
    pub is_dirty: bool,
    angle: ItemAngle,
    picklines: Vec<Point>,
}

impl MaterialItem {
    pub fn new(name: MaterialName, style: MaterialStyle) -> Self {
        Self {
            name,
            style,
            image: None,
            layer: None,
            brushes: Vec::new(),
            pending_brush: None,
            is_dirty: false,
            angle: ItemAngle::Unset,
            picklines: Vec::new(),
        }
    }

    pub fn with_angle(mut self, angle: ItemAngle) -> Self {
        self.angle = angle;
        self
    }

    pub fn angle(&self) -> ItemAngle {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f64, auto: bool) {
        self.angle = if auto {
            ItemAngle::Auto(angle)
        } else {
            ItemAngle::Custom(angle)
        };
    }

    /// Pick-line origins, expressed in units of the inner wheel radius.
    pub fn origins(&self) -> &[Point] {
        &self.picklines
    }

    pub fn set_origins(&mut self, origins: impl IntoIterator<Item = Point>) {
        self.picklines.extend(origins);
    }

    pub fn set_origin(&mut self, origin: Point) {
        match self.picklines.first_mut() {
            Some(first) => *first = origin,
            None => self.picklines.push(origin),
        }
    }

    pub fn count_picklines(&self) -> usize {
        self.picklines.len()
    }

    pub fn has_pickline(&self) -> bool {
        !self.picklines.is_empty()
    }

    pub fn add_brush(&mut self, name: BrushName, is_default: bool) {
        let index = self.brushes.len();
        self.brushes.push(BrushItem {
            name,
            index,
            is_default,
        });
        self.is_dirty = true;
    }

    pub fn accept_pending_brush(&mut self) -> bool {
        match self.pending_brush.take() {
            Some(name) => {
                self.add_brush(name, false);
                true
            }
            None => false,
        }
    }

    pub fn index_brush(&self, name: &BrushName) -> Option<usize> {
        self.brushes.iter().position(|b| &b.name == name)
    }

    pub fn default_brush(&self) -> Option<&BrushItem> {
        self.brushes.iter().find(|b| b.is_default)
    }

    pub fn has_default_brush(&self) -> bool {
        self.default_brush().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Palette {
    pub name: PaletteName,
    pub image: Option<PathBuf>,
    pub autoloaded: bool,
    pub source_path: Option<PathBuf>,
    pub timestamp: Option<SystemTime>,
    pub pending_material: Option<MaterialItem>,
    materials: Vec<MaterialItem>,
    visible: bool,
    is_dirty: bool,
    is_obsolete: bool,
}

impl Palette {
    pub fn new(name: PaletteName) -> Self {
        Self {
            name,
            image: None,
            visible: true,
            autoloaded: false,
            source_path: None,
            timestamp: None,
            pending_material: None,
            materials: Vec::new(),
            is_dirty: false,
            is_obsolete: false,
        }
    }

    pub fn materials(&self) -> &[MaterialItem] {
        &self.materials
    }

    pub fn material(&self, index: usize) -> Option<&MaterialItem> {
        self.materials.get(index)
    }

    pub fn material_mut(&mut self, index: usize) -> Option<&mut MaterialItem> {
        let material = self.materials.get_mut(index)?;
        material.is_dirty = true;
        Some(material)
    }

    pub fn count(&self) -> usize {
        self.materials.len()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    // only the collection may hide a palette, it keeps the active one visible
    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty || self.materials.iter().any(|m| m.is_dirty)
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.is_dirty = false;
        self.materials.iter_mut().for_each(|m| m.is_dirty = false);
    }

    pub fn is_obsolete(&self) -> bool {
        self.is_obsolete
    }

    pub fn set_obsolete(&mut self, obsolete: bool) {
        self.is_obsolete = obsolete;
    }

    pub fn autocomp_positions(&mut self) {
        let entries: Vec<Option<f64>> = self.materials.iter().map(|m| m.angle.custom()).collect();
        let angles = allocate_angles(&entries);

        for (material, angle) in self.materials.iter_mut().zip(angles) {
            if !material.angle.is_custom() {
                material.angle = ItemAngle::Auto(angle);
            }
        }
    }

    pub fn contains_material(&self, name: &MaterialName) -> bool {
        self.index_material(name).is_some()
    }

    pub fn index_material(&self, name: &MaterialName) -> Option<usize> {
        self.materials.iter().position(|m| &m.name == name)
    }

    pub fn index_by_angle(&self, angle: f64) -> usize {
        self.materials
            .iter()
            .position(|m| m.angle.value().is_some_and(|a| a >= angle))
            .unwrap_or(self.materials.len())
    }

    /// Inserts `item` at `index` (or at the end). A material of the same name already
    /// in the palette is moved instead and keeps its data.
    pub fn set_material(&mut self, item: MaterialItem, index: Option<usize>) -> usize {
        let index = self.place(item, index);
        self.autocomp_positions();
        self.is_dirty = true;
        index
    }

    pub fn set_material_by_angle(&mut self, item: MaterialItem, angle: f64, auto: bool) -> usize {
        let target = self.index_by_angle(angle);
        let index = self.place(item, Some(target));
        self.materials[index].set_angle(angle, auto);
        self.autocomp_positions();
        self.is_dirty = true;
        index
    }

    pub fn move_material_by_angle(
        &mut self,
        name: &MaterialName,
        angle: f64,
        auto: bool,
    ) -> Result<usize, PaletteError> {
        let item = self
            .index_material(name)
            .map(|i| self.materials[i].clone())
            .ok_or_else(|| PaletteError::UnknownMaterial(name.clone()))?;
        Ok(self.set_material_by_angle(item, angle, auto))
    }

    fn place(&mut self, item: MaterialItem, index: Option<usize>) -> usize {
        let (old, item) = match self.index_material(&item.name) {
            Some(i) => (i, self.materials.remove(i)),
            None => (self.materials.len(), item),
        };
        let target = match index {
            Some(i) if old < i => i - 1,
            Some(i) => i,
            None => self.materials.len(),
        }
        .min(self.materials.len());

        self.materials.insert(target, item);
        target
    }

    pub fn remove_material(&mut self, index: usize) -> Result<MaterialItem, PaletteError> {
        if index >= self.materials.len() {
            return Err(PaletteError::MaterialIndex(index));
        }
        let removed = self.materials.remove(index);
        self.autocomp_positions();
        self.is_dirty = true;
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.materials.clear();
        self.image = None;
        self.pending_material = None;
        self.is_dirty = true;
    }

    pub fn is_material_available(&self, name: &MaterialName) -> bool {
        !self.contains_material(name)
    }

    /// Adds the pending material, at `angle` when given. The pending slot is always
    /// emptied, even when the material was already in the palette.
    pub fn accept_pending_material(&mut self, angle: Option<f64>) -> bool {
        let Some(item) = self.pending_material.take() else {
            return false;
        };
        if !self.is_material_available(&item.name) {
            log::warn!("Material '{}' is already in palette '{}'", item.name, self.name);
            return false;
        }
        match angle {
            Some(a) => self.set_material_by_angle(item, a, false),
            None => self.set_material(item, None),
        };
        true
    }

    pub fn set_pickline_origin(&mut self, index: usize, origin: Point) -> Result<(), PaletteError> {
        let material = self
            .materials
            .get_mut(index)
            .ok_or(PaletteError::MaterialIndex(index))?;
        material.set_origin(origin);
        self.is_dirty = true;
        Ok(())
    }

    pub fn add_brush(&mut self, index: usize, brush: BrushName, is_default: bool) -> Result<(), PaletteError> {
        self.materials
            .get_mut(index)
            .ok_or(PaletteError::MaterialIndex(index))?
            .add_brush(brush, is_default);
        Ok(())
    }

    pub fn nb_max_picklines(&self) -> usize {
        self.materials
            .iter()
            .map(MaterialItem::count_picklines)
            .max()
            .unwrap_or(0)
    }
}
