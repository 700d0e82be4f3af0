use crate::config::{Settings, SourceMode};
use crate::editor::area::{AreaKind, HostRequest, InteractionArea, Mark};
use crate::events::PointerEvent;
use crate::geometry::Point;
use crate::matpalette::{NavDirection, PaletteCollection};
use crate::picker::{CachedSnapshot, ObjectContext, PreviewProvider};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorOutcome {
    Running { redraw: bool },
    Request(HostRequest),
    Finished,
}

pub struct EditorSession {
    settings: Settings,
    snapshot: CachedSnapshot,
    areas: Vec<InteractionArea>,
    hovered: Option<usize>,
    running: Option<usize>,
    empty_palette: bool,
    pointer: Point,
}

impl EditorSession {
    pub fn new(
        settings: Settings,
        collection: &mut PaletteCollection,
        object: &ObjectContext,
        previews: &mut dyn PreviewProvider,
    ) -> Self {
        log::info!("Entering palette edit mode");
        let snapshot = CachedSnapshot::build(SourceMode::Palette, collection, object, previews);
        collection.all_refreshed();

        let mut session = Self {
            settings,
            snapshot,
            areas: Vec::new(),
            hovered: None,
            running: None,
            empty_palette: collection.is_empty(),
            pointer: Point::ORIGIN,
        };
        session.init_areas();
        session
    }

    pub fn snapshot(&self) -> &CachedSnapshot {
        &self.snapshot
    }

    pub fn areas(&self) -> &[InteractionArea] {
        &self.areas
    }

    pub fn hovered_area(&self) -> Option<&InteractionArea> {
        self.hovered.and_then(|i| self.areas.get(i))
    }

    pub fn is_empty_palette_page(&self) -> bool {
        self.empty_palette
    }

    pub fn mark(&self) -> Option<Mark> {
        self.running
            .or(self.hovered)
            .and_then(|i| self.areas.get(i))
            .and_then(|a| a.mark(&self.snapshot, &self.settings))
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        collection: &mut PaletteCollection,
        object: &ObjectContext,
        previews: &mut dyn PreviewProvider,
    ) -> EditorOutcome {
        self.refresh_if_needed(collection, object, previews);

        match event {
            PointerEvent::Move(pointer) => {
                self.pointer = pointer;
                let redraw = match self.running {
                    Some(r) => {
                        self.areas[r].on_pointer_move(&mut self.snapshot, &self.settings, pointer);
                        true
                    }
                    None => self.update_hover(),
                };
                EditorOutcome::Running { redraw }
            }
            PointerEvent::Press => {
                if self.running.is_none()
                    && let Some(h) = self.hovered
                {
                    self.areas[h].on_press_start(&self.snapshot);
                    self.running = Some(h);
                }
                EditorOutcome::Running { redraw: true }
            }
            PointerEvent::Release => {
                let Some(r) = self.running.take() else {
                    return EditorOutcome::Running { redraw: false };
                };
                let result = self.areas[r].on_press_end(&self.snapshot, collection);
                self.refresh_if_needed(collection, object, previews);
                match result {
                    Ok(Some(request)) => EditorOutcome::Request(request),
                    Ok(None) => EditorOutcome::Running { redraw: true },
                    Err(e) => {
                        log::error!("Could not apply palette edit: {}", e);
                        EditorOutcome::Running { redraw: true }
                    }
                }
            }
            PointerEvent::Switch { reverse } => {
                self.switch(NavDirection::from_reverse(reverse), collection, object, previews);
                EditorOutcome::Running { redraw: true }
            }
            PointerEvent::Cancel => match self.running.take() {
                Some(r) => {
                    self.areas[r].on_cancel(&mut self.snapshot);
                    EditorOutcome::Running { redraw: true }
                }
                None => {
                    log::info!("Leaving palette edit mode");
                    EditorOutcome::Finished
                }
            },
            PointerEvent::Confirm | PointerEvent::Modifier { .. } => {
                EditorOutcome::Running { redraw: false }
            }
        }
    }

    fn refresh_if_needed(
        &mut self,
        collection: &mut PaletteCollection,
        object: &ObjectContext,
        previews: &mut dyn PreviewProvider,
    ) {
        if !collection.needs_refresh() {
            return;
        }
        // a new palette leaves the "add palette" page
        if collection.is_dirty() && self.empty_palette && !collection.is_empty() {
            self.empty_palette = false;
        }
        self.snapshot.refresh(collection, object, previews);
        self.init_areas();
        collection.all_refreshed();
    }

    /// Past the last palette (or before the first one going backward) the editor shows
    /// the empty page offering to create a palette.
    fn switch(
        &mut self,
        direction: NavDirection,
        collection: &mut PaletteCollection,
        object: &ObjectContext,
        previews: &mut dyn PreviewProvider,
    ) {
        if let Some(r) = self.running.take() {
            self.areas[r].on_cancel(&mut self.snapshot);
        }
        if collection.is_empty() {
            return;
        }

        let boundary = match direction {
            NavDirection::Forward => collection.count() - 1,
            NavDirection::Backward => 0,
        };
        if !self.empty_palette && collection.active_index() == Some(boundary) {
            self.empty_palette = true;
        } else {
            self.empty_palette = false;
            collection.next(Some(direction));
            self.snapshot.refresh(collection, object, previews);
            collection.all_refreshed();
        }
        self.init_areas();
    }

    fn init_areas(&mut self) {
        self.running = None;
        self.snapshot.mat_selected = None;
        self.areas = if self.empty_palette {
            vec![InteractionArea::new(AreaKind::AddFirstPaletteWhenEmpty)]
        } else if !self.snapshot.from_palette() {
            // every palette is hidden, there is nothing to edit
            Vec::new()
        } else {
            (0..self.snapshot.count())
                .flat_map(|i| {
                    [
                        InteractionArea::new(AreaKind::MovePickLineAnchor(i)),
                        InteractionArea::new(AreaKind::MoveItemAngle(i)),
                    ]
                })
                .chain([
                    InteractionArea::new(AreaKind::AddItem),
                    InteractionArea::new(AreaKind::ChangeImage),
                ])
                .collect()
        };
        self.hovered = None;
        self.update_hover();
    }

    fn update_hover(&mut self) -> bool {
        let pointer = self.pointer;
        if let Some(h) = self.hovered
            && self.areas[h].is_hovered(&self.snapshot, &self.settings, pointer)
        {
            self.areas[h].on_hover_enter(pointer);
            return false;
        }

        let previous = self.hovered.take();
        for (i, area) in self.areas.iter_mut().enumerate() {
            if self.hovered.is_none() && area.is_hovered(&self.snapshot, &self.settings, pointer) {
                area.on_hover_enter(pointer);
                self.hovered = Some(i);
            } else {
                area.on_hover_exit();
            }
        }
        self.snapshot.mat_selected = self.hovered.and_then(|i| match self.areas[i].kind() {
            AreaKind::MoveItemAngle(m) | AreaKind::MovePickLineAnchor(m) => Some(m),
            _ => None,
        });
        previous != self.hovered
    }
}
