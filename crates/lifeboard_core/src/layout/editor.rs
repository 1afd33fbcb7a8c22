//! Interactive dashboard layout editing with debounced persistence.
//!
//! # Invariants
//! - Edits only touch widgets present in the merged layout.
//! - Widget size is at least 1x1 and never exceeds the grid width.
//! - Every accepted edit schedules one debounced save of the full layout.

use crate::layout::merge::merge_layout;
use crate::layout::widgets::GRID_COLUMNS;
use crate::model::widget::{WidgetDefinition, WidgetLayout};
use crate::runtime::{Debouncer, TimerHost};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Layout edit errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    UnknownWidget(String),
    InvalidSize { width: u32, height: u32 },
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownWidget(id) => write!(f, "unknown widget: {id}"),
            Self::InvalidSize { width, height } => {
                write!(f, "invalid widget size {width}x{height}")
            }
        }
    }
}

impl Error for LayoutError {}

/// Editable dashboard layout for one user.
pub struct LayoutEditor {
    defaults: Vec<WidgetDefinition>,
    layout: Vec<WidgetLayout>,
    saver: Debouncer<Vec<WidgetLayout>>,
}

impl LayoutEditor {
    /// Creates an editor over an already merged layout.
    ///
    /// `on_save` receives the full layout after each quiet period of
    /// `save_delay_ms`.
    pub fn new(
        timers: Rc<dyn TimerHost>,
        save_delay_ms: u64,
        defaults: Vec<WidgetDefinition>,
        layout: Vec<WidgetLayout>,
        on_save: impl FnMut(Vec<WidgetLayout>) + 'static,
    ) -> Self {
        Self {
            defaults,
            layout,
            saver: Debouncer::new(timers, save_delay_ms, on_save),
        }
    }

    pub fn layout(&self) -> &[WidgetLayout] {
        &self.layout
    }

    /// Visible widgets in layout order.
    pub fn visible(&self) -> impl Iterator<Item = &WidgetLayout> {
        self.layout.iter().filter(|widget| widget.is_visible)
    }

    pub fn move_widget(&mut self, id: &str, x: u32, y: u32) -> Result<(), LayoutError> {
        let widget = self.widget_mut(id)?;
        widget.x = x.min(GRID_COLUMNS.saturating_sub(widget.width));
        widget.y = y;
        self.schedule_save();
        Ok(())
    }

    pub fn resize_widget(&mut self, id: &str, width: u32, height: u32) -> Result<(), LayoutError> {
        if width == 0 || height == 0 || width > GRID_COLUMNS {
            return Err(LayoutError::InvalidSize { width, height });
        }
        let widget = self.widget_mut(id)?;
        widget.width = width;
        widget.height = height;
        widget.x = widget.x.min(GRID_COLUMNS - width);
        self.schedule_save();
        Ok(())
    }

    pub fn set_visibility(&mut self, id: &str, visible: bool) -> Result<(), LayoutError> {
        self.widget_mut(id)?.is_visible = visible;
        self.schedule_save();
        Ok(())
    }

    /// Restores the default layout and schedules its save.
    pub fn reset(&mut self) {
        self.layout = merge_layout(&[], &self.defaults);
        self.schedule_save();
    }

    /// Persists pending edits immediately.
    pub fn flush(&self) {
        self.saver.flush();
    }

    pub fn has_pending_save(&self) -> bool {
        self.saver.is_pending()
    }

    fn widget_mut(&mut self, id: &str) -> Result<&mut WidgetLayout, LayoutError> {
        self.layout
            .iter_mut()
            .find(|widget| widget.id == id)
            .ok_or_else(|| LayoutError::UnknownWidget(id.to_string()))
    }

    fn schedule_save(&self) {
        debug!(
            "event=layout_edit module=layout status=scheduled delay_ms={}",
            self.saver.delay_ms()
        );
        self.saver.call(self.layout.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutEditor, LayoutError};
    use crate::layout::{default_layout, merge_layout};
    use crate::model::widget::WidgetLayout;
    use crate::runtime::{EventLoop, TimerHost};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor(event_loop: &Rc<EventLoop>) -> (LayoutEditor, Rc<RefCell<Vec<Vec<WidgetLayout>>>>) {
        let saves = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&saves);
        let defaults = default_layout();
        let layout = merge_layout(&[], &defaults);
        let editor = LayoutEditor::new(
            Rc::clone(event_loop) as Rc<dyn TimerHost>,
            800,
            defaults,
            layout,
            move |layout| sink.borrow_mut().push(layout),
        );
        (editor, saves)
    }

    #[test]
    fn burst_of_edits_saves_once() {
        let event_loop = Rc::new(EventLoop::new());
        let (mut editor, saves) = editor(&event_loop);

        editor.move_widget("tasks", 6, 0).unwrap();
        event_loop.advance_by(200);
        editor.set_visibility("quote", true).unwrap();
        event_loop.advance_by(200);
        editor.resize_widget("tasks", 4, 3).unwrap();

        event_loop.advance_by(799);
        assert!(saves.borrow().is_empty());
        event_loop.advance_by(1);

        let saves = saves.borrow();
        assert_eq!(saves.len(), 1);
        let tasks = saves[0].iter().find(|w| w.id == "tasks").unwrap();
        assert_eq!((tasks.x, tasks.width, tasks.height), (6, 4, 3));
        assert!(saves[0].iter().find(|w| w.id == "quote").unwrap().is_visible);
    }

    #[test]
    fn move_clamps_to_grid_width() {
        let event_loop = Rc::new(EventLoop::new());
        let (mut editor, _) = editor(&event_loop);
        editor.move_widget("goals", 40, 1).unwrap();
        let goals = editor.layout().iter().find(|w| w.id == "goals").unwrap();
        assert_eq!(goals.x, 6);
    }

    #[test]
    fn unknown_widget_and_bad_size_are_rejected() {
        let event_loop = Rc::new(EventLoop::new());
        let (mut editor, _) = editor(&event_loop);
        assert_eq!(
            editor.set_visibility("weather", false),
            Err(LayoutError::UnknownWidget("weather".to_string()))
        );
        assert!(matches!(
            editor.resize_widget("tasks", 0, 2),
            Err(LayoutError::InvalidSize { .. })
        ));
        assert!(!editor.has_pending_save());
    }

    #[test]
    fn dropping_editor_discards_pending_save() {
        let event_loop = Rc::new(EventLoop::new());
        let (mut editor, saves) = editor(&event_loop);
        editor.set_visibility("journal", false).unwrap();
        drop(editor);
        event_loop.advance_by(5_000);
        assert!(saves.borrow().is_empty());
        assert_eq!(event_loop.pending_timers(), 0);
    }
}
