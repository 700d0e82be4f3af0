use crate::config::Settings;
use crate::events::PointerEvent;
use crate::geometry::Point;
use crate::matpalette::{BrushName, LayerName, MaterialName, NavDirection, PaletteCollection};
use crate::picker::cache::{CachedSnapshot, ObjectContext};
use crate::picker::hit::{hit_test_item, hit_test_sub_item};
use crate::picker::preview::PreviewProvider;

#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub material: MaterialName,
    pub brush: Option<BrushName>,
    pub layer: Option<LayerName>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorAction {
    pub should_redraw: bool,
}

impl CursorAction {
    pub fn new(should_redraw: bool) -> Self {
        Self { should_redraw }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickerOutcome {
    Running(CursorAction),
    Picked(Pick),
    Cancelled,
}

pub struct PickerSession {
    settings: Settings,
    snapshot: CachedSnapshot,
    cursor: Point,
    brush_selected: Option<usize>,
    use_default_brushes: bool,
}

impl PickerSession {
    pub fn new(
        settings: Settings,
        collection: &PaletteCollection,
        object: &ObjectContext,
        previews: &mut dyn PreviewProvider,
    ) -> Self {
        let snapshot = CachedSnapshot::build(settings.source, collection, object, previews);
        if snapshot.is_empty() {
            log::warn!("No material to pick");
        }
        let use_default_brushes = settings.use_default_brushes;
        Self {
            settings,
            snapshot,
            cursor: Point::ORIGIN,
            brush_selected: None,
            use_default_brushes,
        }
    }

    pub fn snapshot(&self) -> &CachedSnapshot {
        &self.snapshot
    }

    pub fn selected_material(&self) -> Option<usize> {
        self.snapshot.mat_selected
    }

    pub fn selected_brush(&self) -> Option<usize> {
        self.brush_selected
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        collection: &mut PaletteCollection,
        object: &ObjectContext,
        previews: &mut dyn PreviewProvider,
    ) -> PickerOutcome {
        match event {
            PointerEvent::Move(cursor) => PickerOutcome::Running(self.update_cursor(cursor)),
            PointerEvent::Modifier { shift } => {
                self.use_default_brushes = self.settings.use_default_brushes && !shift;
                PickerOutcome::Running(CursorAction::new(true))
            }
            PointerEvent::Switch { reverse } => {
                collection.next(Some(NavDirection::from_reverse(reverse)));
                self.snapshot.refresh(collection, object, previews);
                self.update_cursor(self.cursor);
                PickerOutcome::Running(CursorAction::new(true))
            }
            PointerEvent::Press | PointerEvent::Release | PointerEvent::Confirm => match self.pick() {
                Some(pick) => PickerOutcome::Picked(pick),
                None => PickerOutcome::Running(CursorAction::default()),
            },
            PointerEvent::Cancel => PickerOutcome::Cancelled,
        }
    }

    /// On the brush ring the material stays selected, so its brushes can be reached
    /// whatever their direction.
    pub fn update_cursor(&mut self, cursor: Point) -> CursorAction {
        self.cursor = cursor;
        let previous = (self.snapshot.mat_selected, self.brush_selected);

        let brush_dead = self.settings.overall_brush_radius - self.settings.brush_band();
        let keep_material = cursor.length() >= brush_dead
            && self
                .snapshot
                .selected_material()
                .is_some_and(|m| !m.brushes.is_empty());

        if !keep_material {
            self.snapshot.mat_selected = hit_test_item(
                cursor,
                self.snapshot.count(),
                self.settings.interaction_radius,
                self.snapshot.layout(),
            );
        }

        self.brush_selected = self.snapshot.mat_selected.and_then(|i| {
            let count = self.snapshot.material(i).map_or(0, |m| m.brushes.len());
            hit_test_sub_item(
                cursor,
                self.snapshot.angle(i)?,
                count,
                self.settings.brush_band(),
                self.settings.overall_brush_radius,
            )
        });

        CursorAction::new(previous != (self.snapshot.mat_selected, self.brush_selected))
    }

    fn pick(&self) -> Option<Pick> {
        let material = self.snapshot.selected_material()?;
        let brush = self
            .brush_selected
            .or(material.default_brush.filter(|_| self.use_default_brushes))
            .and_then(|i| material.brushes.get(i))
            .cloned();

        log::info!(
            "Picked material '{}'{}",
            material.name,
            brush.as_ref().map(|b| format!(" with brush '{b}'")).unwrap_or_default()
        );
        Some(Pick {
            material: material.name.clone(),
            brush,
            layer: material.layer.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceMode;
    use crate::geometry::degrees_to_radians;
    use crate::matpalette::{MaterialItem, MaterialStyle, PaletteName};
    use crate::picker::preview::NoPreviews;

    fn at(deg: f64, radius: f64) -> PointerEvent {
        PointerEvent::Move(Point::from_polar(radius, degrees_to_radians(deg)))
    }

    fn add_palette(collection: &mut PaletteCollection, name: &str, materials: &[(&str, f64)]) {
        let index = collection.add_palette(PaletteName::new(name)).unwrap();
        let palette = collection.get_mut(index).unwrap();
        for &(material, deg) in materials {
            let item = MaterialItem::new(MaterialName::new(material), MaterialStyle::default());
            palette.set_material_by_angle(item, degrees_to_radians(deg), false);
        }
    }

    fn setup() -> (PaletteCollection, PickerSession) {
        let mut collection = PaletteCollection::new();
        add_palette(
            &mut collection,
            "warm",
            &[("red", 0.0), ("orange", 90.0), ("yellow", 180.0), ("brown", 270.0)],
        );
        let palette = collection.get_mut(0).unwrap();
        palette.add_brush(1, BrushName::new("pencil"), false).unwrap();
        palette.add_brush(1, BrushName::new("ink"), true).unwrap();
        palette.material_mut(2).unwrap().layer = Some(LayerName::new("sky"));
        add_palette(&mut collection, "cold", &[("blue", 45.0)]);
        collection.set_active_index(Some(0)).unwrap();

        let session = PickerSession::new(
            Settings::default(),
            &collection,
            &ObjectContext::default(),
            &mut NoPreviews,
        );
        (collection, session)
    }

    fn send(
        session: &mut PickerSession,
        collection: &mut PaletteCollection,
        event: PointerEvent,
    ) -> PickerOutcome {
        session.handle(event, collection, &ObjectContext::default(), &mut NoPreviews)
    }

    #[test]
    fn test_pick_follows_pointer() {
        let (mut collection, mut session) = setup();
        assert_eq!(
            send(&mut session, &mut collection, at(30.0, 100.0)),
            PickerOutcome::Running(CursorAction::new(true))
        );
        assert_eq!(session.selected_material(), Some(0));
        assert_eq!(
            send(&mut session, &mut collection, at(31.0, 100.0)),
            PickerOutcome::Running(CursorAction::new(false))
        );

        send(&mut session, &mut collection, at(170.0, 100.0));
        assert_eq!(
            send(&mut session, &mut collection, PointerEvent::Confirm),
            PickerOutcome::Picked(Pick {
                material: MaterialName::new("yellow"),
                brush: None,
                layer: Some(LayerName::new("sky")),
            })
        );
    }

    #[test]
    fn test_nothing_picked_in_dead_zone() {
        let (mut collection, mut session) = setup();
        send(&mut session, &mut collection, at(30.0, 10.0));
        assert_eq!(session.selected_material(), None);
        assert_eq!(
            send(&mut session, &mut collection, PointerEvent::Release),
            PickerOutcome::Running(CursorAction::default())
        );
        assert_eq!(
            send(&mut session, &mut collection, PointerEvent::Cancel),
            PickerOutcome::Cancelled
        );
    }

    #[test]
    fn test_default_brush_and_shift() {
        let (mut collection, mut session) = setup();
        send(&mut session, &mut collection, at(90.0, 100.0));
        let picked = send(&mut session, &mut collection, PointerEvent::Press);
        assert!(
            matches!(picked, PickerOutcome::Picked(Pick { brush: Some(ref b), .. }) if b.as_str() == "ink")
        );

        send(&mut session, &mut collection, PointerEvent::Modifier { shift: true });
        let picked = send(&mut session, &mut collection, PointerEvent::Press);
        assert!(matches!(picked, PickerOutcome::Picked(Pick { brush: None, .. })));
    }

    #[test]
    fn test_brush_ring_keeps_material() {
        let (mut collection, mut session) = setup();
        send(&mut session, &mut collection, at(90.0, 100.0));
        // brush 0 faces the material, brush 1 is on the opposite side
        send(&mut session, &mut collection, at(90.0, 185.0));
        assert_eq!(session.selected_brush(), Some(0));
        send(&mut session, &mut collection, at(265.0, 185.0));
        assert_eq!(session.selected_material(), Some(1));
        assert_eq!(session.selected_brush(), Some(1));

        let picked = send(&mut session, &mut collection, PointerEvent::Confirm);
        assert_eq!(
            picked,
            PickerOutcome::Picked(Pick {
                material: MaterialName::new("orange"),
                brush: Some(BrushName::new("ink")),
                layer: None,
            })
        );
    }

    #[test]
    fn test_switch_refreshes_snapshot() {
        let (mut collection, mut session) = setup();
        send(&mut session, &mut collection, at(200.0, 100.0));
        send(&mut session, &mut collection, PointerEvent::Switch { reverse: false });
        assert_eq!(collection.active_index(), Some(1));
        assert_eq!(session.snapshot().count(), 1);
        assert_eq!(session.selected_material(), Some(0));

        send(&mut session, &mut collection, PointerEvent::Switch { reverse: true });
        assert_eq!(session.snapshot().count(), 4);
        assert_eq!(session.selected_material(), Some(2));
    }

    #[test]
    fn test_active_object_source() {
        let collection = PaletteCollection::new();
        let object = ObjectContext {
            materials: vec![
                (MaterialName::new("a"), MaterialStyle::default()),
                (MaterialName::new("b"), MaterialStyle::default()),
            ],
            active_material: Some(0),
            active_brush: None,
        };
        let settings = Settings {
            source: SourceMode::ActiveObject,
            ..Settings::default()
        };
        let mut session = PickerSession::new(settings, &collection, &object, &mut NoPreviews);
        session.update_cursor(Point::new(-100.0, 5.0));
        assert_eq!(session.selected_material(), Some(1));
        assert_eq!(session.selected_brush(), None);
    }
}
