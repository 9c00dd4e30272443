//! Células de seleção persistentes, lidas e escritas pelo resto do motor.

/// Duas células de 32 bits independentes; sem validação
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineState {
    selected_index: i32,
    selected_area: i32,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_index(&self) -> i32 {
        self.selected_index
    }

    pub fn set_selected_index(&mut self, value: i32) {
        self.selected_index = value;
    }

    pub fn selected_area(&self) -> i32 {
        self.selected_area
    }

    pub fn set_selected_area(&mut self, value: i32) {
        self.selected_area = value;
    }
}
