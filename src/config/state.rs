// src/config/state.rs
use std::collections::HashSet;

use super::options::AppOptions;
use crate::claim::Stage;
use crate::grid::Cell;

#[derive(Clone, Debug)]
pub struct GuiState {
    /// Cell clicked on the map; its claims fill the table.
    pub selected_cell: Option<Cell>,

    /// Stages hidden from the map (legend toggles).
    pub hidden_stages: HashSet<Stage>,

    pub window_w: u32,
    pub window_h: u32,

    /// Editable copy of the method sequence; parsed when a run starts.
    pub methods_text: String,
}

impl Default for GuiState {
    fn default() -> Self {
        // Design-stage claims start hidden so in-progress work stands out.
        let mut hidden_stages = HashSet::new();
        hidden_stages.insert(Stage::Design);

        Self {
            selected_cell: None,
            hidden_stages,
            window_w: 1200,
            window_h: 900,
            methods_text: s!(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub options: AppOptions,
    pub gui: GuiState,
}

impl AppState {
    pub fn new(options: AppOptions) -> Self {
        let gui = GuiState {
            methods_text: options.resolve.methods.to_string(),
            ..GuiState::default()
        };
        Self { options, gui }
    }
}
