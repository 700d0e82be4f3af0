use crate::config::Settings;
use crate::geometry::{Point, angle_difference};
use crate::matpalette::{PaletteCollection, PaletteError};
use crate::picker::CachedSnapshot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaKind {
    MoveItemAngle(usize),
    MovePickLineAnchor(usize),
    AddItem,
    ChangeImage,
    AddFirstPaletteWhenEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Armed,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostRequest {
    NewPalette,
    EditImage,
    AddMaterial { angle: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mark {
    pub position: Point,
    pub radius: f64,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Saved {
    None,
    Angle { value: f64, is_custom: bool },
    Anchor(Option<Point>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionArea {
    kind: AreaKind,
    hovered: bool,
    phase: Phase,
    saved: Saved,
    pointer: Point,
}

impl InteractionArea {
    pub fn new(kind: AreaKind) -> Self {
        Self {
            kind,
            hovered: false,
            phase: Phase::Idle,
            saved: Saved::None,
            pointer: Point::ORIGIN,
        }
    }

    pub fn kind(&self) -> AreaKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_hovered(&self, snapshot: &CachedSnapshot, settings: &Settings, pointer: Point) -> bool {
        let dist = pointer.length();
        match self.kind {
            AreaKind::MoveItemAngle(i) => item_center(snapshot, settings, i)
                .is_some_and(|c| c.distance(pointer) <= settings.mat_radius),
            AreaKind::MovePickLineAnchor(i) => anchor_position(snapshot, settings, i)
                .is_some_and(|a| a.distance(pointer) <= settings.mark_radius),
            AreaKind::AddItem => {
                (dist - settings.mat_centers_radius).abs() <= settings.mat_radius
            }
            AreaKind::ChangeImage => dist <= settings.tex_radius,
            AreaKind::AddFirstPaletteWhenEmpty => {
                dist <= settings.mat_centers_radius + settings.mat_radius
            }
        }
    }

    pub fn on_hover_enter(&mut self, pointer: Point) {
        self.hovered = true;
        self.pointer = pointer;
    }

    pub fn on_hover_exit(&mut self) {
        self.hovered = false;
    }

    pub fn on_press_start(&mut self, snapshot: &CachedSnapshot) {
        assert!(self.phase == Phase::Idle, "{:?} pressed while already armed", self.kind);
        self.saved = match self.kind {
            AreaKind::MoveItemAngle(i) => Saved::Angle {
                value: snapshot.angle(i).unwrap_or_default(),
                is_custom: snapshot.material(i).is_some_and(|m| m.is_custom_angle),
            },
            AreaKind::MovePickLineAnchor(i) => Saved::Anchor(snapshot.pickline_origin(i)),
            _ => Saved::None,
        };
        self.phase = Phase::Armed;
    }

    pub fn on_pointer_move(&mut self, snapshot: &mut CachedSnapshot, settings: &Settings, pointer: Point) {
        assert!(self.phase != Phase::Idle, "{:?} dragged without a press", self.kind);
        self.phase = Phase::Dragging;
        self.pointer = pointer;

        match self.kind {
            AreaKind::MoveItemAngle(i) => snapshot.preview_angle(i, pointer.angle()),
            AreaKind::MovePickLineAnchor(i) => {
                let origin = (pointer * (1.0 / settings.pickline_scale())).clamp_length(1.0);
                snapshot.preview_pickline_origin(i, Some(origin));
            }
            _ => {}
        }
    }

    pub fn on_press_end(
        &mut self,
        snapshot: &CachedSnapshot,
        collection: &mut PaletteCollection,
    ) -> Result<Option<HostRequest>, PaletteError> {
        assert!(self.phase != Phase::Idle, "{:?} released without a press", self.kind);
        let dragged = self.phase == Phase::Dragging;
        let saved = std::mem::replace(&mut self.saved, Saved::None);
        self.phase = Phase::Idle;

        match self.kind {
            AreaKind::MoveItemAngle(i) | AreaKind::MovePickLineAnchor(i) if !dragged => {
                log::debug!("Item {} clicked without moving", i);
                Ok(None)
            }
            AreaKind::MoveItemAngle(i) => {
                let (Some(material), Some(angle)) = (snapshot.material(i), snapshot.angle(i)) else {
                    return Err(PaletteError::MaterialIndex(i));
                };
                if let Saved::Angle { value, is_custom: true } = saved
                    && angle_difference(value, angle) == 0.0
                {
                    return Ok(None);
                }
                let Some(palette) = collection.active_mut() else {
                    log::warn!("No active palette to move '{}' in", material.name);
                    return Ok(None);
                };
                palette.move_material_by_angle(&material.name, angle, false)?;
                log::info!("Moved '{}' to {:.1}°", material.name, angle.to_degrees());
                Ok(None)
            }
            AreaKind::MovePickLineAnchor(i) => {
                let (Some(material), Some(origin)) = (snapshot.material(i), snapshot.pickline_origin(i))
                else {
                    return Err(PaletteError::MaterialIndex(i));
                };
                let Some(palette) = collection.active_mut() else {
                    log::warn!("No active palette to edit '{}' in", material.name);
                    return Ok(None);
                };
                let index = palette
                    .index_material(&material.name)
                    .ok_or_else(|| PaletteError::UnknownMaterial(material.name.clone()))?;
                palette.set_pickline_origin(index, origin)?;
                Ok(None)
            }
            AreaKind::AddItem => {
                let angle = self.pointer.angle();
                match collection.active_mut() {
                    Some(palette) if palette.pending_material.is_some() => {
                        palette.accept_pending_material(Some(angle));
                        Ok(None)
                    }
                    _ => Ok(Some(HostRequest::AddMaterial { angle })),
                }
            }
            AreaKind::ChangeImage => Ok(Some(HostRequest::EditImage)),
            AreaKind::AddFirstPaletteWhenEmpty => Ok(Some(HostRequest::NewPalette)),
        }
    }

    pub fn on_cancel(&mut self, snapshot: &mut CachedSnapshot) {
        match (self.kind, self.saved) {
            (AreaKind::MoveItemAngle(i), Saved::Angle { value, is_custom }) => {
                snapshot.restore_angle(i, value, is_custom)
            }
            (AreaKind::MovePickLineAnchor(i), Saved::Anchor(origin)) => {
                snapshot.preview_pickline_origin(i, origin)
            }
            _ => {}
        }
        self.phase = Phase::Idle;
        self.saved = Saved::None;
    }

    pub fn mark(&self, snapshot: &CachedSnapshot, settings: &Settings) -> Option<Mark> {
        let running = self.phase != Phase::Idle;
        if !self.hovered && !running {
            return None;
        }
        let (position, radius) = match self.kind {
            AreaKind::MoveItemAngle(i) => (item_center(snapshot, settings, i)?, settings.selected_radius),
            AreaKind::MovePickLineAnchor(i) => (anchor_position(snapshot, settings, i)?, settings.mark_radius),
            AreaKind::AddItem => (
                Point::from_polar(settings.mat_centers_radius, self.pointer.angle()),
                settings.mat_radius,
            ),
            AreaKind::ChangeImage => (Point::ORIGIN, settings.tex_radius),
            AreaKind::AddFirstPaletteWhenEmpty => (Point::ORIGIN, settings.mat_centers_radius),
        };
        Some(Mark {
            position,
            radius,
            running,
        })
    }
}

fn item_center(snapshot: &CachedSnapshot, settings: &Settings, index: usize) -> Option<Point> {
    snapshot
        .angle(index)
        .map(|a| Point::from_polar(settings.mat_centers_radius, a))
}

/// Pixel position of an item's pick-line anchor. Items without a pick line show a
/// default anchor halfway along their direction.
pub fn anchor_position(snapshot: &CachedSnapshot, settings: &Settings, index: usize) -> Option<Point> {
    let scale = settings.pickline_scale();
    match snapshot.pickline_origin(index) {
        Some(origin) => Some(origin * scale),
        None => snapshot.angle(index).map(|a| Point::from_polar(0.5 * scale, a)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceMode;
    use crate::geometry::degrees_to_radians;
    use crate::matpalette::{MaterialItem, MaterialName, MaterialStyle, PaletteName};
    use crate::picker::{NoPreviews, ObjectContext};
    use approx::assert_relative_eq;

    fn setup() -> (PaletteCollection, CachedSnapshot) {
        let mut collection = PaletteCollection::new();
        collection.add_palette(PaletteName::new("p")).unwrap();
        let palette = collection.active_mut().unwrap();
        for (name, deg) in [("a", 0.0), ("b", 90.0), ("c", 180.0)] {
            let item = MaterialItem::new(MaterialName::new(name), MaterialStyle::default());
            palette.set_material_by_angle(item, degrees_to_radians(deg), false);
        }
        collection.all_refreshed();
        let snapshot = CachedSnapshot::build(
            SourceMode::Palette,
            &collection,
            &ObjectContext::default(),
            &mut NoPreviews,
        );
        (collection, snapshot)
    }

    #[test]
    fn test_hover_shapes() {
        let (_, snapshot) = setup();
        let settings = Settings::default();
        let hovered = |kind, p| InteractionArea::new(kind).is_hovered(&snapshot, &settings, p);

        assert!(hovered(AreaKind::MoveItemAngle(1), Point::new(5.0, 95.0)));
        assert!(!hovered(AreaKind::MoveItemAngle(1), Point::new(95.0, 5.0)));
        // default anchor halfway between origin and the item
        assert!(hovered(AreaKind::MovePickLineAnchor(1), Point::new(0.0, 40.0)));
        assert!(!hovered(AreaKind::MovePickLineAnchor(1), Point::new(0.0, 60.0)));
        assert!(hovered(AreaKind::AddItem, Point::from_polar(115.0, 1.0)));
        assert!(!hovered(AreaKind::AddItem, Point::from_polar(130.0, 1.0)));
        assert!(hovered(AreaKind::ChangeImage, Point::new(10.0, 10.0)));
        assert!(hovered(AreaKind::AddFirstPaletteWhenEmpty, Point::new(0.0, 110.0)));
    }

    #[test]
    fn test_drag_cancel_restores_snapshot() {
        let (mut collection, mut snapshot) = setup();
        let settings = Settings::default();
        let before_angle = snapshot.angle(1).unwrap();

        let mut area = InteractionArea::new(AreaKind::MoveItemAngle(1));
        area.on_press_start(&snapshot);
        assert_eq!(area.phase(), Phase::Armed);
        for deg in [100.0, 120.0, 135.5] {
            area.on_pointer_move(&mut snapshot, &settings, Point::from_polar(100.0, degrees_to_radians(deg)));
        }
        assert_eq!(area.phase(), Phase::Dragging);
        assert_relative_eq!(snapshot.angle(1).unwrap(), degrees_to_radians(135.5), epsilon = 1e-12);
        area.on_cancel(&mut snapshot);
        assert_eq!(snapshot.angle(1).unwrap().to_bits(), before_angle.to_bits());

        let mut anchor = InteractionArea::new(AreaKind::MovePickLineAnchor(2));
        anchor.on_press_start(&snapshot);
        anchor.on_pointer_move(&mut snapshot, &settings, Point::new(-20.0, 20.0));
        assert!(snapshot.pickline_origin(2).is_some());
        anchor.on_cancel(&mut snapshot);
        assert_eq!(snapshot.pickline_origin(2), None);

        assert!(!collection.needs_refresh());
        assert!(collection.active_mut().unwrap().material(2).unwrap().origins().is_empty());
    }

    #[test]
    fn test_drag_commit_writes_final_value() {
        let (mut collection, mut snapshot) = setup();
        let settings = Settings::default();

        let mut area = InteractionArea::new(AreaKind::MoveItemAngle(0));
        area.on_press_start(&snapshot);
        area.on_pointer_move(&mut snapshot, &settings, Point::from_polar(50.0, 2.0));
        area.on_pointer_move(&mut snapshot, &settings, Point::from_polar(50.0, 2.5));
        let final_angle = snapshot.angle(0).unwrap();
        assert_eq!(area.on_press_end(&snapshot, &mut collection), Ok(None));
        assert_eq!(area.phase(), Phase::Idle);
        assert!(collection.needs_refresh());

        snapshot.refresh(&collection, &ObjectContext::default(), &mut NoPreviews);
        let palette = collection.active().unwrap();
        let moved = palette.index_material(&MaterialName::new("a")).unwrap();
        assert_eq!(moved, 1);
        assert_eq!(snapshot.angle(moved), Some(final_angle));
        assert!(snapshot.material(moved).unwrap().is_custom_angle);
    }

    #[test]
    fn test_drag_back_to_start_writes_nothing() {
        let (mut collection, mut snapshot) = setup();
        let settings = Settings::default();
        let start = snapshot.angle(1).unwrap();

        let mut area = InteractionArea::new(AreaKind::MoveItemAngle(1));
        area.on_press_start(&snapshot);
        area.on_pointer_move(&mut snapshot, &settings, Point::from_polar(100.0, 2.0));
        snapshot.preview_angle(1, start);
        assert_eq!(area.on_press_end(&snapshot, &mut collection), Ok(None));
        assert!(!collection.needs_refresh());
    }

    #[test]
    fn test_anchor_commit_and_clicks() {
        let (mut collection, mut snapshot) = setup();
        let settings = Settings::default();

        let mut anchor = InteractionArea::new(AreaKind::MovePickLineAnchor(1));
        anchor.on_press_start(&snapshot);
        assert_eq!(anchor.on_press_end(&snapshot, &mut collection), Ok(None));
        assert!(!collection.needs_refresh());

        anchor.on_press_start(&snapshot);
        anchor.on_pointer_move(&mut snapshot, &settings, Point::new(0.0, 400.0));
        anchor.on_press_end(&snapshot, &mut collection).unwrap();
        let origins = collection.active().unwrap().material(1).unwrap().origins().to_vec();
        assert_eq!(origins.len(), 1);
        assert_relative_eq!(origins[0].length(), 1.0, epsilon = 1e-12);
        assert!(collection.needs_refresh());

        let mut image = InteractionArea::new(AreaKind::ChangeImage);
        image.on_press_start(&snapshot);
        assert_eq!(image.on_press_end(&snapshot, &mut collection), Ok(Some(HostRequest::EditImage)));
    }

    #[test]
    fn test_add_item_uses_pending_material() {
        let (mut collection, snapshot) = setup();
        let mut add = InteractionArea::new(AreaKind::AddItem);
        add.on_hover_enter(Point::new(0.0, -100.0));
        add.on_press_start(&snapshot);
        let request = add.on_press_end(&snapshot, &mut collection).unwrap();
        assert!(matches!(request, Some(HostRequest::AddMaterial { angle }) if (angle - 1.5 * std::f64::consts::PI).abs() < 1e-12));

        collection.active_mut().unwrap().pending_material =
            Some(MaterialItem::new(MaterialName::new("d"), MaterialStyle::default()));
        add.on_press_start(&snapshot);
        assert_eq!(add.on_press_end(&snapshot, &mut collection), Ok(None));
        assert_eq!(collection.active().unwrap().count(), 4);
    }

    #[test]
    fn test_mark_follows_hover() {
        let (_, snapshot) = setup();
        let settings = Settings::default();
        let mut area = InteractionArea::new(AreaKind::MoveItemAngle(1));
        assert_eq!(area.mark(&snapshot, &settings), None);
        area.on_hover_enter(Point::new(0.0, 100.0));
        let mark = area.mark(&snapshot, &settings).unwrap();
        assert_relative_eq!(mark.position.y, 100.0, epsilon = 1e-9);
        assert_eq!(mark.radius, settings.selected_radius);
        assert!(!mark.running);
    }

    #[test]
    #[should_panic(expected = "pressed while already armed")]
    fn test_double_press_panics() {
        let (_, snapshot) = setup();
        let mut area = InteractionArea::new(AreaKind::MoveItemAngle(0));
        area.on_press_start(&snapshot);
        area.on_press_start(&snapshot);
    }

    #[test]
    #[should_panic(expected = "released without a press")]
    fn test_release_without_press_panics() {
        let (mut collection, snapshot) = setup();
        let mut area = InteractionArea::new(AreaKind::ChangeImage);
        let _ = area.on_press_end(&snapshot, &mut collection);
    }
}
