use crate::matpalette::{BrushName, MaterialName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewSource<'a> {
    Material(&'a MaterialName),
    Brush(&'a BrushName),
}

impl std::fmt::Display for PreviewSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Material(name) => write!(f, "material '{name}'"),
            Self::Brush(name) => write!(f, "brush '{name}'"),
        }
    }
}

/// RGBA float pixels, row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f32>,
}

impl PreviewImage {
    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub fn is_usable(&self) -> bool {
        let len = self.expected_len();
        len > 0 && self.pixels.len() >= len && self.pixels.iter().any(|&p| p != 0.0)
    }
}

pub trait PreviewProvider {
    fn preview(&self, source: PreviewSource) -> Option<PreviewImage>;

    /// Brushes only get a preview when they use a custom icon.
    fn uses_custom_icon(&self, _brush: &BrushName) -> bool {
        false
    }

    fn request_regeneration(&mut self, source: PreviewSource);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoPreviews;

impl PreviewProvider for NoPreviews {
    fn preview(&self, _source: PreviewSource) -> Option<PreviewImage> {
        None
    }

    fn request_regeneration(&mut self, _source: PreviewSource) {}
}

pub fn load_preview(
    provider: &mut dyn PreviewProvider,
    source: PreviewSource,
) -> Option<PreviewImage> {
    match provider.preview(source) {
        Some(image) if image.is_usable() => Some(image),
        Some(_) => {
            provider.request_regeneration(source);
            log::warn!("Could not load {} preview image", source);
            None
        }
        None => {
            provider.request_regeneration(source);
            log::warn!("{} has no preview image", source);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        image: Option<PreviewImage>,
        regenerated: usize,
    }

    impl PreviewProvider for Fixed {
        fn preview(&self, _source: PreviewSource) -> Option<PreviewImage> {
            self.image.clone()
        }

        fn request_regeneration(&mut self, _source: PreviewSource) {
            self.regenerated += 1;
        }
    }

    fn load(image: Option<PreviewImage>) -> (Option<PreviewImage>, usize) {
        let mut provider = Fixed {
            image,
            regenerated: 0,
        };
        let name = MaterialName::new("ink");
        let loaded = load_preview(&mut provider, PreviewSource::Material(&name));
        (loaded, provider.regenerated)
    }

    #[test]
    fn test_usable_preview_is_returned() {
        let image = PreviewImage {
            width: 1,
            height: 1,
            pixels: vec![0.2, 0.0, 0.0, 1.0],
        };
        assert_eq!(load(Some(image.clone())), (Some(image), 0));
    }

    #[test]
    fn test_bad_previews_request_one_regeneration() {
        let blank = PreviewImage {
            width: 2,
            height: 1,
            pixels: vec![0.0; 8],
        };
        let empty = PreviewImage {
            width: 0,
            height: 4,
            pixels: Vec::new(),
        };
        let truncated = PreviewImage {
            width: 2,
            height: 2,
            pixels: vec![1.0; 4],
        };
        for image in [None, Some(blank), Some(empty), Some(truncated)] {
            assert_eq!(load(image), (None, 1));
        }
    }
}
