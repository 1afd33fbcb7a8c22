//! Code-defined default dashboard layout.

use crate::model::widget::{WidgetDefinition, WidgetKind};

/// Grid width of the dashboard, in columns.
pub const GRID_COLUMNS: u32 = 12;

/// Returns the authoritative default layout, ordered top-left to bottom-right.
pub fn default_layout() -> Vec<WidgetDefinition> {
    vec![
        definition("stats", WidgetKind::Stats, "Overview", 0, 0, 12, 2, Some(true)),
        definition("tasks", WidgetKind::Tasks, "Today's Tasks", 0, 2, 6, 4, Some(true)),
        definition("goals", WidgetKind::Goals, "Goals", 6, 2, 6, 4, Some(true)),
        definition("calendar", WidgetKind::Calendar, "Calendar", 0, 6, 8, 4, Some(true)),
        definition("journal", WidgetKind::Journal, "Journal", 8, 6, 4, 4, None),
        definition("quote", WidgetKind::Quote, "Daily Quote", 0, 10, 12, 2, Some(false)),
    ]
}

#[allow(clippy::too_many_arguments)]
fn definition(
    id: &str,
    kind: WidgetKind,
    title: &str,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    is_visible: Option<bool>,
) -> WidgetDefinition {
    WidgetDefinition {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        x,
        y,
        width,
        height,
        is_visible,
    }
}

#[cfg(test)]
mod tests {
    use super::{default_layout, GRID_COLUMNS};
    use std::collections::HashSet;

    #[test]
    fn default_ids_are_unique_and_fit_the_grid() {
        let layout = default_layout();
        let ids: HashSet<_> = layout.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids.len(), layout.len());
        assert!(layout.iter().all(|w| w.x + w.width <= GRID_COLUMNS));
    }
}
