//! Host-side contracts: a surface polygons are drawn on and a panel that takes markup.

use crate::types::{Boundary, LayerId, PathStyle, ViewportState};

pub trait MapSurface {
    /// Draws every boundary as its own layer; layer ids follow slice order.
    fn add_boundaries(&mut self, boundaries: &[Boundary], style: &PathStyle);
    fn set_style(&mut self, layer: LayerId, style: &PathStyle);
    fn bring_to_front(&mut self, layer: LayerId);
    fn set_view(&mut self, viewport: &ViewportState);
}

pub trait DetailPanel {
    fn set_markup(&mut self, markup: String);
    fn markup(&self) -> &str;
    fn scroll_to_top(&mut self);
}

/// Surface state kept in memory and mirrored to the browser by the server.
#[derive(Debug, Default)]
pub struct SessionSurface {
    styles: Vec<PathStyle>,
    // Back to front.
    order: Vec<LayerId>,
    viewport: Option<ViewportState>,
}

impl SessionSurface {
    pub fn style(&self, layer: LayerId) -> Option<&PathStyle> {
        self.styles.get(layer.0)
    }

    pub fn layers_with_style(&self, style: &PathStyle) -> Vec<LayerId> {
        self.styles
            .iter()
            .enumerate()
            .filter(|(_, s)| *s == style)
            .map(|(i, _)| LayerId(i))
            .collect()
    }

    pub fn front(&self) -> Option<LayerId> {
        self.order.last().copied()
    }

    pub fn viewport(&self) -> Option<&ViewportState> {
        self.viewport.as_ref()
    }

    pub fn layer_count(&self) -> usize {
        self.styles.len()
    }
}

impl MapSurface for SessionSurface {
    fn add_boundaries(&mut self, boundaries: &[Boundary], style: &PathStyle) {
        self.styles = vec![*style; boundaries.len()];
        self.order = (0..boundaries.len()).map(LayerId).collect();
    }

    fn set_style(&mut self, layer: LayerId, style: &PathStyle) {
        if let Some(slot) = self.styles.get_mut(layer.0) {
            *slot = *style;
        }
    }

    fn bring_to_front(&mut self, layer: LayerId) {
        if let Some(pos) = self.order.iter().position(|l| *l == layer) {
            let layer = self.order.remove(pos);
            self.order.push(layer);
        }
    }

    fn set_view(&mut self, viewport: &ViewportState) {
        self.viewport = Some(*viewport);
    }
}

#[derive(Debug, Default)]
pub struct SessionPanel {
    markup: String,
    scroll_top: u32,
}

impl SessionPanel {
    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    pub fn scroll_to(&mut self, offset: u32) {
        self.scroll_top = offset;
    }
}

impl DetailPanel for SessionPanel {
    fn set_markup(&mut self, markup: String) {
        self.markup = markup;
    }

    fn markup(&self) -> &str {
        &self.markup
    }

    fn scroll_to_top(&mut self) {
        self.scroll_top = 0;
    }
}
