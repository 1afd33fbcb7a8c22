//! Stored-layout reconciliation.
//!
//! # Responsibility
//! - Overlay a user's persisted widget overrides onto the default layout.
//! - Read persisted layout JSON while tolerating schema drift.
//!
//! # Invariants
//! - Output order and id set equal the default layout's.
//! - Stored ids missing from the defaults are dropped.
//! - `merge_layout` is pure and idempotent over its own output.

use crate::model::widget::{StoredWidget, WidgetDefinition, WidgetLayout, WidgetSettings};
use log::warn;
use serde_json::Value;
use std::collections::HashMap;

/// Merges `stored` overrides onto `defaults`.
///
/// For every default entry the first stored entry with the same id
/// contributes its present fields. Visibility resolves to the stored value,
/// then the default value, then `true`.
pub fn merge_layout(stored: &[StoredWidget], defaults: &[WidgetDefinition]) -> Vec<WidgetLayout> {
    let mut by_id: HashMap<&str, &StoredWidget> = HashMap::with_capacity(stored.len());
    for entry in stored {
        by_id.entry(entry.id.as_str()).or_insert(entry);
    }

    defaults
        .iter()
        .map(|default| {
            let overlay = by_id.get(default.id.as_str()).copied();
            merge_one(default, overlay)
        })
        .collect()
}

fn merge_one(default: &WidgetDefinition, stored: Option<&StoredWidget>) -> WidgetLayout {
    let settings = stored
        .and_then(|entry| entry.settings.as_ref())
        .and_then(|value| WidgetSettings::from_stored(default.kind, value))
        .unwrap_or_else(|| WidgetSettings::default_for(default.kind));

    WidgetLayout {
        id: default.id.clone(),
        kind: default.kind,
        title: stored
            .and_then(|entry| entry.title.clone())
            .unwrap_or_else(|| default.title.clone()),
        x: stored.and_then(|entry| entry.x).unwrap_or(default.x),
        y: stored.and_then(|entry| entry.y).unwrap_or(default.y),
        width: stored
            .and_then(|entry| entry.width)
            .filter(|width| *width > 0)
            .unwrap_or(default.width),
        height: stored
            .and_then(|entry| entry.height)
            .filter(|height| *height > 0)
            .unwrap_or(default.height),
        is_visible: stored
            .and_then(|entry| entry.is_visible)
            .or(default.is_visible)
            .unwrap_or(true),
        settings,
    }
}

/// Parses a persisted layout JSON document into stored overrides.
///
/// Never fails: a document that is not a JSON array yields no overrides,
/// and malformed entries are skipped.
pub fn parse_stored_layout(raw: &str) -> Vec<StoredWidget> {
    let document: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("event=layout_parse module=layout status=error reason=invalid_json error={err}");
            return Vec::new();
        }
    };

    let Some(entries) = document.as_array() else {
        warn!("event=layout_parse module=layout status=error reason=not_an_array");
        return Vec::new();
    };

    let mut stored = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    for entry in entries {
        match StoredWidget::from_value(entry) {
            Some(widget) => stored.push(widget),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("event=layout_parse module=layout status=partial skipped={skipped}");
    }
    stored
}

/// Converts a merged layout back into its persisted form.
pub fn to_stored_layout(layout: &[WidgetLayout]) -> Vec<StoredWidget> {
    layout.iter().map(StoredWidget::from).collect()
}
