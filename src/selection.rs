use crate::surface::MapSurface;
use crate::types::{LayerId, DEFAULT_STYLE, HIGHLIGHT_STYLE};

/// Holds at most one highlighted layer.
#[derive(Debug)]
pub struct SelectionController<S> {
    surface: S,
    selected: Option<LayerId>,
}

impl<S: MapSurface> SelectionController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Restores the previous selection, then highlights `layer` and raises it.
    pub fn select(&mut self, layer: LayerId) {
        if let Some(prev) = self.selected.take() {
            self.surface.set_style(prev, &DEFAULT_STYLE);
        }
        self.surface.set_style(layer, &HIGHLIGHT_STYLE);
        self.surface.bring_to_front(layer);
        self.selected = Some(layer);
    }

    pub fn clear(&mut self) {
        if let Some(prev) = self.selected.take() {
            self.surface.set_style(prev, &DEFAULT_STYLE);
        }
    }
}
