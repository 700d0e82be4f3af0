use crate::matpalette::model::{Palette, PaletteError, PaletteName};
use indexmap::IndexMap;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum NavDirection {
    #[default]
    Forward,
    Backward,
}

impl NavDirection {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse { Self::Backward } else { Self::Forward }
    }

    fn advance(self, index: usize, steps: usize, len: usize) -> usize {
        match self {
            Self::Forward => (index + steps) % len,
            Self::Backward => (index + len - steps % len) % len,
        }
    }
}

/// Next visible index after `index` going around the circle in `direction`.
///
/// Starting from `None`, the search begins at the first index in that direction.
/// `index` itself is only returned when it is the sole visible entry.
pub fn next_visible(
    index: Option<usize>,
    direction: NavDirection,
    visibility: &[bool],
) -> Option<usize> {
    let len = visibility.len();
    if len == 0 {
        return None;
    }
    let start = match (index, direction) {
        (Some(i), _) => i.min(len - 1),
        (None, NavDirection::Forward) => len - 1,
        (None, NavDirection::Backward) => 0,
    };

    (1..=len)
        .map(|steps| direction.advance(start, steps, len))
        .find(|&i| visibility[i])
}

#[derive(Debug, Clone, Default)]
pub struct PaletteCollection {
    palettes: IndexMap<PaletteName, Palette>,
    active_index: Option<usize>,
    mem_dir: NavDirection,
    is_dirty: bool,
}

impl PaletteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn palettes(&self) -> impl Iterator<Item = &Palette> {
        self.palettes.values()
    }

    pub fn get(&self, index: usize) -> Option<&Palette> {
        self.palettes.get_index(index).map(|(_, p)| p)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Palette> {
        self.palettes.get_index_mut(index).map(|(_, p)| p)
    }

    pub fn index_of(&self, name: &PaletteName) -> Option<usize> {
        self.palettes.get_index_of(name)
    }

    pub fn by_name(&self, name: &PaletteName) -> Option<&Palette> {
        self.palettes.get(name)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn active(&self) -> Option<&Palette> {
        self.active_index.and_then(|i| self.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut Palette> {
        self.active_index.and_then(|i| self.get_mut(i))
    }

    pub fn direction(&self) -> NavDirection {
        self.mem_dir
    }

    pub fn visibility(&self) -> Vec<bool> {
        self.palettes.values().map(Palette::is_visible).collect()
    }

    /// Moves to the next visible palette. Without a direction the last one used is
    /// kept.
    pub fn next(&mut self, direction: Option<NavDirection>) {
        if let Some(dir) = direction {
            self.mem_dir = dir;
        }
        let next = next_visible(self.active_index, self.mem_dir, &self.visibility());
        self.update_active(next);
    }

    pub fn set_active_index(&mut self, index: Option<usize>) -> Result<(), PaletteError> {
        let resolved = match index {
            None => None,
            Some(i) => {
                let palette = self.get(i).ok_or(PaletteError::PaletteIndex(i))?;
                if palette.is_visible() {
                    Some(i)
                } else {
                    next_visible(Some(i), self.mem_dir, &self.visibility())
                }
            }
        };
        self.update_active(resolved);
        Ok(())
    }

    fn update_active(&mut self, index: Option<usize>) {
        if self.active_index != index {
            self.active_index = index;
            self.is_dirty = true;
        }
    }

    pub fn add_palette(&mut self, name: PaletteName) -> Result<usize, PaletteError> {
        if name.trim().is_empty() {
            return Err(PaletteError::EmptyName);
        }
        if self.palettes.contains_key(&name) {
            return Err(PaletteError::DuplicatePalette(name));
        }
        let index = self.insert_palette(Palette::new(name));
        self.update_active(Some(index));
        Ok(index)
    }

    pub fn insert_palette(&mut self, palette: Palette) -> usize {
        let visible = palette.is_visible();
        let (index, _) = self.palettes.insert_full(palette.name.clone(), palette);
        self.is_dirty = true;
        if self.active_index == Some(index) && !visible {
            self.next(None);
        }
        index
    }

    pub fn remove_palette(&mut self, name: &PaletteName) -> Option<Palette> {
        let index = self.index_of(name)?;
        self.remove_palette_by_id(index).ok()
    }

    pub fn remove_palette_by_id(&mut self, index: usize) -> Result<Palette, PaletteError> {
        let (_, removed) = self
            .palettes
            .shift_remove_index(index)
            .ok_or(PaletteError::PaletteIndex(index))?;
        self.is_dirty = true;

        let len = self.palettes.len();
        match self.active_index {
            Some(a) if a == index => {
                // the following palette takes the removed one's place
                let candidate = if index < len { Some(index) } else { len.checked_sub(1) };
                self.active_index = None;
                self.set_active_index(candidate)?;
            }
            Some(a) if a > index => self.active_index = Some(a - 1),
            _ => {}
        }
        Ok(removed)
    }

    pub fn toggle_visibility(&mut self, index: usize) -> Result<bool, PaletteError> {
        let palette = self.get_mut(index).ok_or(PaletteError::PaletteIndex(index))?;
        let visible = !palette.is_visible();
        palette.set_visible(visible);
        self.is_dirty = true;

        match self.active_index {
            Some(a) if a == index && !visible => self.next(None),
            None if visible => self.update_active(Some(index)),
            _ => {}
        }
        Ok(visible)
    }

    pub fn clear(&mut self) {
        self.palettes.clear();
        self.active_index = None;
        self.is_dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn needs_refresh(&self) -> bool {
        self.is_dirty || self.palettes.values().any(Palette::is_dirty)
    }

    pub fn all_refreshed(&mut self) {
        self.is_dirty = false;
        self.palettes.values_mut().for_each(Palette::clear_dirty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(visibility: &[bool]) -> PaletteCollection {
        let mut c = PaletteCollection::new();
        for (i, &visible) in visibility.iter().enumerate() {
            c.add_palette(PaletteName::new(format!("p{i}"))).unwrap();
            c.get_mut(i).unwrap().set_visible(visible);
        }
        c.active_index = Some(0);
        c.all_refreshed();
        c
    }

    #[test]
    fn test_next_skips_hidden_palettes() {
        let mut c = collection(&[true, false, true]);
        c.next(Some(NavDirection::Forward));
        assert_eq!(c.active_index(), Some(2));
        assert!(c.needs_refresh());

        c.next(None);
        assert_eq!(c.active_index(), Some(0));

        c.next(Some(NavDirection::Backward));
        assert_eq!(c.active_index(), Some(2));
        assert_eq!(c.direction(), NavDirection::Backward);
    }

    #[test]
    fn test_next_visible_pure_function() {
        assert_eq!(next_visible(Some(0), NavDirection::Forward, &[true, false, true]), Some(2));
        assert_eq!(next_visible(Some(2), NavDirection::Forward, &[true, false, true]), Some(0));
        assert_eq!(next_visible(Some(0), NavDirection::Backward, &[true, true, false]), Some(1));
        assert_eq!(next_visible(Some(1), NavDirection::Forward, &[false, true, false]), Some(1));
        assert_eq!(next_visible(None, NavDirection::Forward, &[false, true]), Some(1));
        assert_eq!(next_visible(None, NavDirection::Backward, &[true, false, false]), Some(0));
        assert_eq!(next_visible(Some(0), NavDirection::Forward, &[false, false]), None);
        assert_eq!(next_visible(None, NavDirection::Forward, &[]), None);
    }

    #[test]
    fn test_hidden_active_palette_is_never_selected() {
        let mut c = collection(&[true, true, true]);
        c.next(Some(NavDirection::Forward));
        c.get_mut(2).unwrap().set_visible(false);
        c.set_active_index(Some(2)).unwrap();
        assert_eq!(c.active_index(), Some(0));

        for i in 0..3 {
            c.get_mut(i).unwrap().set_visible(false);
        }
        c.set_active_index(Some(1)).unwrap();
        assert_eq!(c.active_index(), None);
        assert!(c.active().is_none());
        assert_eq!(c.set_active_index(Some(7)), Err(PaletteError::PaletteIndex(7)));
    }

    #[test]
    fn test_toggle_visibility_moves_active() {
        let mut c = collection(&[true, true, true]);
        assert_eq!(c.toggle_visibility(0), Ok(false));
        assert_eq!(c.active_index(), Some(1));

        c.toggle_visibility(1).unwrap();
        c.toggle_visibility(2).unwrap();
        assert_eq!(c.active_index(), None);

        assert_eq!(c.toggle_visibility(2), Ok(true));
        assert_eq!(c.active_index(), Some(2));
    }

    #[test]
    fn test_add_palette_validates_names() {
        let mut c = PaletteCollection::new();
        assert_eq!(c.add_palette(PaletteName::new("  ")), Err(PaletteError::EmptyName));
        assert_eq!(c.add_palette(PaletteName::new("a")), Ok(0));
        assert_eq!(c.add_palette(PaletteName::new("b")), Ok(1));
        assert_eq!(c.active_index(), Some(1));
        assert_eq!(
            c.add_palette(PaletteName::new("a")),
            Err(PaletteError::DuplicatePalette(PaletteName::new("a")))
        );
    }

    #[test]
    fn test_remove_palette_keeps_active_consistent() {
        let mut c = collection(&[true, true, true, true]);
        c.set_active_index(Some(1)).unwrap();
        c.remove_palette_by_id(1).unwrap();
        assert_eq!(c.active().map(|p| p.name.as_str()), Some("p2"));

        c.remove_palette_by_id(0).unwrap();
        assert_eq!(c.active().map(|p| p.name.as_str()), Some("p2"));
        assert_eq!(c.active_index(), Some(0));

        c.set_active_index(Some(1)).unwrap();
        c.remove_palette(&PaletteName::new("p3")).unwrap();
        assert_eq!(c.active().map(|p| p.name.as_str()), Some("p2"));

        c.remove_palette_by_id(0).unwrap();
        assert_eq!(c.active_index(), None);
        assert!(c.is_empty());
        assert!(c.remove_palette_by_id(0).is_err());
    }

    #[test]
    fn test_hidden_replacement_of_active_palette_moves_active() {
        let mut c = collection(&[true, true]);
        let mut hidden = Palette::new(PaletteName::new("p0"));
        hidden.set_visible(false);
        assert_eq!(c.insert_palette(hidden), 0);
        assert_eq!(c.active_index(), Some(1));
        assert!(c.active().is_some_and(Palette::is_visible));

        let mut hidden = Palette::new(PaletteName::new("p1"));
        hidden.set_visible(false);
        c.insert_palette(hidden);
        assert_eq!(c.active_index(), None);
    }

    #[test]
    fn test_editing_active_palette_keeps_it_visible() {
        let mut c = collection(&[true, false]);
        let active = c.active_mut().unwrap();
        active.autoloaded = true;
        active.clear();
        assert!(c.active().is_some_and(|p| p.is_visible() && p.autoloaded));

        c.toggle_visibility(0).unwrap();
        assert_eq!(c.active_index(), None);
        assert!(!c.get(0).unwrap().is_visible());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut c = collection(&[true, true]);
        let mut replacement = Palette::new(PaletteName::new("p0"));
        replacement.autoloaded = true;
        assert_eq!(c.insert_palette(replacement), 0);
        assert_eq!(c.count(), 2);
        assert!(c.get(0).unwrap().autoloaded);
        assert!(c.needs_refresh());
        c.all_refreshed();
        assert!(!c.needs_refresh());
    }
}
