use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Meta,
}

/// A mouse press on a label layer, with the viewer state needed to address
/// the clicked region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// World coordinates, one per viewer axis.
    pub position: Vec<f64>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Viewer axes currently on screen.
    pub dims_displayed: Vec<usize>,
    /// Viewer navigation index per axis.
    #[serde(default)]
    pub current_step: Vec<usize>,
}

impl ClickEvent {
    pub fn new(position: Vec<f64>, dims_displayed: Vec<usize>) -> Self {
        Self {
            position,
            modifiers: vec![Modifier::Shift],
            dims_displayed,
            current_step: Vec::new(),
        }
    }

    pub fn with_current_step(mut self, current_step: Vec<usize>) -> Self {
        self.current_step = current_step;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Copies are triggered by shift-click.
    pub fn is_copy_trigger(&self) -> bool {
        self.modifiers.contains(&Modifier::Shift)
    }
}
