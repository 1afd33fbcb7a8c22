//! Dashboard widget layout model.
//!
//! # Responsibility
//! - Define the merged (`WidgetLayout`), code-defined (`WidgetDefinition`)
//!   and persisted (`StoredWidget`) shapes of a dashboard widget.
//! - Replace open-ended widget option bags with a versioned, kind-tagged
//!   `WidgetConfig` union.
//!
//! # Invariants
//! - `WidgetLayout::is_visible` is always concrete.
//! - A `WidgetSettings` value always matches the kind of the widget holding it.
//! - Parsing persisted widgets never fails on unknown keys or wrong-typed
//!   optional fields; they read as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current version written for every widget config.
pub const WIDGET_CONFIG_VERSION: u32 = 1;

/// Known dashboard widget kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Tasks,
    Goals,
    Journal,
    Calendar,
    Stats,
    Quote,
}

impl WidgetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Goals => "goals",
            Self::Journal => "journal",
            Self::Calendar => "calendar",
            Self::Stats => "stats",
            Self::Quote => "quote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksWidgetConfig {
    pub limit: u8,
    pub show_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalsWidgetConfig {
    pub limit: u8,
    pub show_archived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalWidgetConfig {
    pub show_mood: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWidgetConfig {
    pub week_starts_monday: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsWidgetConfig {
    pub show_completion_rate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteWidgetConfig {
    pub category: Option<String>,
}

/// Kind-tagged widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetConfig {
    Tasks(TasksWidgetConfig),
    Goals(GoalsWidgetConfig),
    Journal(JournalWidgetConfig),
    Calendar(CalendarWidgetConfig),
    Stats(StatsWidgetConfig),
    Quote(QuoteWidgetConfig),
}

impl WidgetConfig {
    /// Default configuration for one widget kind.
    pub fn default_for(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Tasks => Self::Tasks(TasksWidgetConfig {
                limit: 5,
                show_completed: false,
            }),
            WidgetKind::Goals => Self::Goals(GoalsWidgetConfig {
                limit: 3,
                show_archived: false,
            }),
            WidgetKind::Journal => Self::Journal(JournalWidgetConfig { show_mood: true }),
            WidgetKind::Calendar => Self::Calendar(CalendarWidgetConfig {
                week_starts_monday: true,
            }),
            WidgetKind::Stats => Self::Stats(StatsWidgetConfig {
                show_completion_rate: true,
            }),
            WidgetKind::Quote => Self::Quote(QuoteWidgetConfig { category: None }),
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::Tasks(_) => WidgetKind::Tasks,
            Self::Goals(_) => WidgetKind::Goals,
            Self::Journal(_) => WidgetKind::Journal,
            Self::Calendar(_) => WidgetKind::Calendar,
            Self::Stats(_) => WidgetKind::Stats,
            Self::Quote(_) => WidgetKind::Quote,
        }
    }
}

/// Versioned envelope around a widget config, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    pub version: u32,
    pub config: WidgetConfig,
}

impl WidgetSettings {
    pub fn default_for(kind: WidgetKind) -> Self {
        Self {
            version: WIDGET_CONFIG_VERSION,
            config: WidgetConfig::default_for(kind),
        }
    }

    /// Reads persisted settings for a widget of `kind`.
    ///
    /// Returns `None` for malformed JSON, unsupported versions and configs
    /// tagged with another kind.
    pub fn from_stored(kind: WidgetKind, value: &Value) -> Option<Self> {
        let settings: WidgetSettings = serde_json::from_value(value.clone()).ok()?;
        if settings.version != WIDGET_CONFIG_VERSION || settings.config.kind() != kind {
            return None;
        }
        Some(settings)
    }
}

/// Code-defined default entry for one widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDefinition {
    pub id: String,
    pub kind: WidgetKind,
    pub title: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Unset means visible.
    pub is_visible: Option<bool>,
}

/// Persisted per-user override for one widget. Every field but `id` is
/// optional so older or partial layouts still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWidget {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

impl StoredWidget {
    /// Leniently reads one persisted entry.
    ///
    /// Returns `None` when `value` is not an object or has no string `id`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id")?.as_str()?.trim();
        if id.is_empty() {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            title: object
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
            x: read_u32(object, "x"),
            y: read_u32(object, "y"),
            width: read_u32(object, "width").or_else(|| read_u32(object, "w")),
            height: read_u32(object, "height").or_else(|| read_u32(object, "h")),
            is_visible: object.get("isVisible").and_then(Value::as_bool),
            settings: object.get("settings").filter(|v| v.is_object()).cloned(),
        })
    }
}

fn read_u32(object: &Map<String, Value>, key: &str) -> Option<u32> {
    object
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
}

/// Merged widget as rendered on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetLayout {
    pub id: String,
    pub kind: WidgetKind,
    pub title: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub is_visible: bool,
    pub settings: WidgetSettings,
}

impl From<&WidgetLayout> for StoredWidget {
    fn from(widget: &WidgetLayout) -> Self {
        Self {
            id: widget.id.clone(),
            title: Some(widget.title.clone()),
            x: Some(widget.x),
            y: Some(widget.y),
            width: Some(widget.width),
            height: Some(widget.height),
            is_visible: Some(widget.is_visible),
            settings: serde_json::to_value(&widget.settings).ok(),
        }
    }
}
