use crate::config::SourceMode;
use crate::geometry::Point;
use crate::matpalette::{
    BrushName, LayerName, MaterialItem, MaterialName, MaterialStyle, Palette, PaletteCollection,
    PaletteName, Rgba, allocate_angles,
};
use crate::picker::hit::Layout;
use crate::picker::preview::{PreviewImage, PreviewProvider, PreviewSource, load_preview};
use indexmap::{IndexMap, IndexSet};
use std::f64::consts::TAU;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct ObjectContext {
    pub materials: Vec<(MaterialName, MaterialStyle)>,
    pub active_material: Option<usize>,
    pub active_brush: Option<BrushName>,
}

impl ObjectContext {
    pub fn active_material_name(&self) -> Option<&MaterialName> {
        self.active_material
            .and_then(|i| self.materials.get(i))
            .map(|(name, _)| name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotKind {
    Palette(PaletteName),
    ActiveObject,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickLineAnchor {
    pub origin: Point,
    pub item: usize,
}

#[derive(Debug, Clone)]
pub struct CachedMaterial {
    pub name: MaterialName,
    pub layer: Option<LayerName>,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub is_flat: bool,
    pub is_custom_angle: bool,
    pub origins: Vec<Point>,
    pub brushes: Vec<BrushName>,
    pub active_brush: Option<usize>,
    pub default_brush: Option<usize>,
    pub preview: Option<PreviewImage>,
}

impl CachedMaterial {
    fn new(name: MaterialName, style: &MaterialStyle) -> Self {
        Self {
            name,
            layer: None,
            fill: style.fill_rgba(),
            stroke: style.stroke_rgba(),
            is_flat: style.is_flat(),
            is_custom_angle: false,
            origins: Vec::new(),
            brushes: Vec::new(),
            active_brush: None,
            default_brush: None,
            preview: None,
        }
    }

    fn from_item(item: &MaterialItem, active_brush: Option<&BrushName>) -> Self {
        Self {
            layer: item.layer.clone(),
            is_custom_angle: item.angle().is_custom(),
            origins: item.origins().to_vec(),
            brushes: item.brushes.iter().map(|b| b.name.clone()).collect(),
            active_brush: active_brush.and_then(|name| item.index_brush(name)),
            default_brush: item.default_brush().map(|b| b.index),
            ..Self::new(item.name.clone(), &item.style)
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    source: SourceMode,
    kind: SnapshotKind,
    palette_image: Option<PathBuf>,
    materials: Vec<CachedMaterial>,
    angles: Vec<f64>,
    brush_previews: IndexMap<BrushName, PreviewImage>,
    mat_active: Option<usize>,
    pub mat_selected: Option<usize>,
}

impl CachedSnapshot {
    pub fn new(source: SourceMode) -> Self {
        Self {
            source,
            kind: SnapshotKind::Empty,
            palette_image: None,
            materials: Vec::new(),
            angles: Vec::new(),
            brush_previews: IndexMap::new(),
            mat_active: None,
            mat_selected: None,
        }
    }

    pub fn build(
        source: SourceMode,
        collection: &PaletteCollection,
        object: &ObjectContext,
        previews: &mut dyn PreviewProvider,
    ) -> Self {
        let mut snapshot = Self::new(source);
        snapshot.refresh(collection, object, previews);
        snapshot
    }

    /// Rebuilds the whole snapshot. The transient selection is dropped.
    pub fn refresh(
        &mut self,
        collection: &PaletteCollection,
        object: &ObjectContext,
        previews: &mut dyn PreviewProvider,
    ) {
        match (self.source, collection.active()) {
            (SourceMode::Palette, Some(palette)) => self.load_palette(palette, object),
            (SourceMode::ActiveObject, _) => self.load_object(object),
            (SourceMode::Palette, None) => {
                log::warn!("No active palette");
                self.load_empty();
            }
        }
        self.mat_selected = None;
        self.load_previews(previews);

        log::debug!(
            "Snapshot refreshed from {:?} with {} materials",
            self.kind,
            self.materials.len()
        );
    }

    fn load_palette(&mut self, palette: &Palette, object: &ObjectContext) {
        let active_brush = object.active_brush.as_ref();
        self.kind = SnapshotKind::Palette(palette.name.clone());
        self.palette_image = palette.image.clone();
        self.materials = palette
            .materials()
            .iter()
            .map(|m| CachedMaterial::from_item(m, active_brush))
            .collect();

        let entries: Vec<Option<f64>> =
            palette.materials().iter().map(|m| m.angle().value()).collect();
        self.angles = allocate_angles(&entries);
        self.mat_active = object
            .active_material_name()
            .and_then(|name| palette.index_material(name));
    }

    fn load_object(&mut self, object: &ObjectContext) {
        let n = object.materials.len();
        self.kind = SnapshotKind::ActiveObject;
        self.palette_image = None;
        self.materials = object
            .materials
            .iter()
            .map(|(name, style)| CachedMaterial::new(name.clone(), style))
            .collect();
        self.angles = (0..n).map(|i| TAU * i as f64 / n as f64).collect();
        self.mat_active = object.active_material.filter(|&i| i < n);
    }

    fn load_empty(&mut self) {
        self.kind = SnapshotKind::Empty;
        self.palette_image = None;
        self.materials.clear();
        self.angles.clear();
        self.mat_active = None;
    }

    fn load_previews(&mut self, previews: &mut dyn PreviewProvider) {
        for material in self.materials.iter_mut() {
            material.preview = if material.is_flat {
                None
            } else {
                load_preview(previews, PreviewSource::Material(&material.name))
            };
        }

        self.brush_previews.clear();
        let brushes: IndexSet<BrushName> = self
            .materials
            .iter()
            .flat_map(|m| m.brushes.iter().cloned())
            .collect();
        for brush in brushes {
            if !previews.uses_custom_icon(&brush) {
                continue;
            }
            if let Some(image) = load_preview(previews, PreviewSource::Brush(&brush)) {
                self.brush_previews.insert(brush, image);
            }
        }
    }

    pub fn source(&self) -> SourceMode {
        self.source
    }

    pub fn kind(&self) -> &SnapshotKind {
        &self.kind
    }

    pub fn from_palette(&self) -> bool {
        matches!(self.kind, SnapshotKind::Palette(_))
    }

    pub fn palette_name(&self) -> Option<&PaletteName> {
        match &self.kind {
            SnapshotKind::Palette(name) => Some(name),
            _ => None,
        }
    }

    pub fn palette_image(&self) -> Option<&PathBuf> {
        self.palette_image.as_ref()
    }

    pub fn use_palette_image(&self) -> bool {
        self.from_palette() && self.palette_image.is_some()
    }

    pub fn count(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn materials(&self) -> &[CachedMaterial] {
        &self.materials
    }

    pub fn material(&self, index: usize) -> Option<&CachedMaterial> {
        self.materials.get(index)
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn angle(&self, index: usize) -> Option<f64> {
        self.angles.get(index).copied()
    }

    pub fn layout(&self) -> Layout<'_> {
        match self.kind {
            SnapshotKind::Palette(_) => Layout::Custom(&self.angles),
            _ => Layout::Uniform,
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.mat_active
    }

    pub fn selected_material(&self) -> Option<&CachedMaterial> {
        self.mat_selected.and_then(|i| self.materials.get(i))
    }

    pub fn brush_preview(&self, brush: &BrushName) -> Option<&PreviewImage> {
        self.brush_previews.get(brush)
    }

    pub fn pick_lines(&self) -> Vec<PickLineAnchor> {
        self.materials
            .iter()
            .enumerate()
            .flat_map(|(item, m)| m.origins.iter().map(move |&origin| PickLineAnchor { origin, item }))
            .collect()
    }

    pub fn nb_max_picklines(&self) -> usize {
        self.materials
            .iter()
            .map(|m| m.origins.len())
            .max()
            .unwrap_or(0)
    }

    pub fn preview_angle(&mut self, index: usize, angle: f64) {
        if let Some(a) = self.angles.get_mut(index) {
            *a = angle;
        }
        if let Some(m) = self.materials.get_mut(index) {
            m.is_custom_angle = true;
        }
    }

    pub fn restore_angle(&mut self, index: usize, angle: f64, is_custom: bool) {
        if let Some(a) = self.angles.get_mut(index) {
            *a = angle;
        }
        if let Some(m) = self.materials.get_mut(index) {
            m.is_custom_angle = is_custom;
        }
    }

    pub fn pickline_origin(&self, index: usize) -> Option<Point> {
        self.materials.get(index)?.origins.first().copied()
    }

    /// Moves the first pick line of an item without touching the palette. `None` removes it.
    pub fn preview_pickline_origin(&mut self, index: usize, origin: Option<Point>) {
        let Some(m) = self.materials.get_mut(index) else {
            return;
        };
        match origin {
            Some(o) => match m.origins.first_mut() {
                Some(first) => *first = o,
                None => m.origins.push(o),
            },
            None if !m.origins.is_empty() => {
                m.origins.remove(0);
            }
            None => {}
        }
    }
}
