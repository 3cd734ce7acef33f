use std::sync::Arc;

use tracing::debug;

use crate::document::DocumentStore;
use crate::errors::EditorError;
use crate::gateway::ResumeGateway;
use crate::models::resume::{ResumeId, SectionKey, SectionPayload};
use crate::sections::save_cycle::{SaveCycle, SaveReport, SaveState};

/// Colours offered by the theme picker.
pub const THEME_PALETTE: [&str; 20] = [
    "#FF5733", "#3366FF", "#33CC99", "#9933CC", "#FF3366", "#33CCFF", "#FF9933", "#66CC33",
    "#CC3366", "#339999", "#6633CC", "#CC6633", "#336699", "#CC9933", "#993366", "#669933",
    "#333333", "#666666", "#0077B5", "#2E77BC",
];

/// Shown when the document carries no colour yet.
pub const FALLBACK_THEME_COLOR: &str = "#333333";

/// Theme colour picker. Unlike the list sections, a selection is persisted at once.
/// It is not a wizard step, so there is no navigation gate.
pub struct ThemeController {
    id: ResumeId,
    store: DocumentStore,
    gateway: Arc<dyn ResumeGateway>,
    cycle: Arc<SaveCycle>,
}

impl ThemeController {
    pub fn new(store: DocumentStore, gateway: Arc<dyn ResumeGateway>) -> Result<Self, EditorError> {
        let id = store.require()?.id.clone();
        Ok(Self {
            id,
            store,
            gateway,
            cycle: SaveCycle::new(SectionKey::ThemeColor, None),
        })
    }

    pub fn current_color(&self) -> String {
        self.store
            .snapshot()
            .map(|doc| doc.theme_color.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| FALLBACK_THEME_COLOR.to_string())
    }

    pub fn save_state(&self) -> SaveState {
        self.cycle.state()
    }

    /// Writes the colour into the shared document and persists it. While a previous
    /// selection is still being stored the call is refused and nothing changes.
    pub async fn select(&self, color: &str) -> Result<SaveReport, EditorError> {
        validate_color(color)?;
        self.cycle.ensure_idle()?;

        self.store
            .update(&self.id, |doc| doc.theme_color = color.to_string())?;
        let ticket = self.cycle.begin()?;
        ticket
            .persist(
                self.gateway.clone(),
                self.id.clone(),
                SectionPayload::ThemeColor(color.to_string()),
            )
            .await
    }
}

impl Drop for ThemeController {
    fn drop(&mut self) {
        debug!("Tearing down 'themeColor' controller for resume {}", self.id);
        self.cycle.detach();
    }
}

/// Accepts `#RRGGBB`.
pub fn validate_color(color: &str) -> Result<(), EditorError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(EditorError::Validation(format!(
            "'{color}' is not a #RRGGBB colour"
        )));
    }
    Ok(())
}
