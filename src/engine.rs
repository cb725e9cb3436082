use crate::aggregate::aggregate;
use crate::catalog::FieldCatalog;
use crate::chart::{render_chart, ChartSpec};
use crate::models::{
    DashboardSnapshot, LayoutEntry, Layouts, WidgetConfig, WidgetDraft, CANONICAL_BREAKPOINT,
};
use crate::persistence::{DashboardScope, KeyValueStore, PersistenceAdapter};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Grid rows a freshly added widget occupies.
pub const DEFAULT_WIDGET_HEIGHT: i32 = 8;

/// One rendered widget, ready for the page: resolved chart plus placement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetChart {
    pub widget_id: String,
    pub title: String,
    pub spec: ChartSpec,
    pub placement: LayoutEntry,
}

/// Owns one dashboard scope: the ordered widget registry, the per-breakpoint
/// layouts, and the persistence behind both. All mutations persist
/// immediately; persistence failures never reach the caller.
pub struct DashboardEngine {
    scope: DashboardScope,
    adapter: PersistenceAdapter,
    widgets: Vec<WidgetConfig>,
    layouts: Layouts,
}

impl DashboardEngine {
    /// Loads the persisted state for `scope`, falling back to
    /// `default_widgets` (and an empty layout) when nothing usable is
    /// stored.
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        scope: DashboardScope,
        default_widgets: &[WidgetConfig],
    ) -> Self {
        let adapter = PersistenceAdapter::new(store);
        let (widgets, layouts) = adapter.load(&scope, default_widgets);
        Self {
            scope,
            adapter,
            widgets,
            layouts,
        }
    }

    pub fn scope(&self) -> &DashboardScope {
        &self.scope
    }

    pub fn widgets(&self) -> &[WidgetConfig] {
        &self.widgets
    }

    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            widgets: self.widgets.clone(),
            layouts: self.layouts.clone(),
        }
    }

    /// Adds a widget with a fresh id, stacked below every existing
    /// placement so nothing overlaps, and persists the pair.
    pub fn add_widget(&mut self, draft: WidgetDraft) -> WidgetConfig {
        let widget = WidgetConfig {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            chart: draft.chart,
            x_field: draft.x_field,
            y_field: draft.y_field,
            metric: draft.metric,
            palette: draft.palette,
            md: draft.md,
        };
        let entry = LayoutEntry {
            i: widget.id.clone(),
            x: 0,
            y: self.next_free_y(),
            w: widget.grid_width(),
            h: DEFAULT_WIDGET_HEIGHT,
        };
        self.layouts
            .entry(CANONICAL_BREAKPOINT.to_string())
            .or_default()
            .push(entry);
        self.widgets.push(widget.clone());
        self.persist();
        widget
    }

    /// Replaces the widget's configuration in place, keeping its id and
    /// registry position. The placement is only touched when the configured
    /// width changed. Unknown ids are a no-op; the UI only edits ids it has
    /// already displayed.
    pub fn edit_widget(&mut self, id: &str, draft: WidgetDraft) {
        let Some(index) = self.widgets.iter().position(|widget| widget.id == id) else {
            tracing::debug!(widget_id = id, "edit for unknown widget ignored");
            return;
        };
        let previous_width = self.widgets[index].grid_width();
        self.widgets[index] = WidgetConfig {
            id: id.to_string(),
            title: draft.title,
            chart: draft.chart,
            x_field: draft.x_field,
            y_field: draft.y_field,
            metric: draft.metric,
            palette: draft.palette,
            md: draft.md,
        };
        let new_width = self.widgets[index].grid_width();
        if new_width != previous_width {
            if let Some(entries) = self.layouts.get_mut(CANONICAL_BREAKPOINT) {
                if let Some(entry) = entries.iter_mut().find(|entry| entry.i == id) {
                    entry.w = new_width;
                }
            }
        }
        self.persist();
    }

    /// Removes the widget and its placements across every breakpoint.
    /// Unknown ids leave everything untouched, including the store.
    pub fn delete_widget(&mut self, id: &str) {
        if !self.widgets.iter().any(|widget| widget.id == id) {
            tracing::debug!(widget_id = id, "delete for unknown widget ignored");
            return;
        }
        self.widgets.retain(|widget| widget.id != id);
        for entries in self.layouts.values_mut() {
            entries.retain(|entry| entry.i != id);
        }
        self.persist();
    }

    /// Wholesale layout replacement from the grid UI. Called continuously
    /// during drag and resize, so it only serializes; it never recomputes
    /// aggregation and never touches the widget registry.
    pub fn apply_layout_change(&mut self, layouts: Layouts) {
        self.layouts = layouts;
        self.persist();
    }

    /// The widget's canonical placement, or a default stacked by registry
    /// index when the layout has no entry for it (orphaned entries for
    /// deleted widgets are simply never asked for).
    pub fn placement_for(&self, id: &str) -> Option<LayoutEntry> {
        let index = self.widgets.iter().position(|widget| widget.id == id)?;
        Some(self.placement_at(index))
    }

    /// Aggregates and renders every widget against the given records.
    pub fn render_dashboard<R>(
        &self,
        records: &[R],
        catalog: &FieldCatalog<R>,
    ) -> Vec<WidgetChart> {
        self.widgets
            .iter()
            .enumerate()
            .map(|(index, widget)| {
                let series = aggregate(
                    records,
                    catalog,
                    &widget.x_field,
                    widget.metric,
                    widget.y_field.as_deref(),
                );
                WidgetChart {
                    widget_id: widget.id.clone(),
                    title: widget.title.clone(),
                    spec: render_chart(widget, &series),
                    placement: self.placement_at(index),
                }
            })
            .collect()
    }

    fn placement_at(&self, index: usize) -> LayoutEntry {
        let widget = &self.widgets[index];
        self.layouts
            .get(CANONICAL_BREAKPOINT)
            .and_then(|entries| entries.iter().find(|entry| entry.i == widget.id).cloned())
            .unwrap_or_else(|| LayoutEntry {
                i: widget.id.clone(),
                x: 0,
                y: index as i32 * DEFAULT_WIDGET_HEIGHT,
                w: widget.grid_width(),
                h: DEFAULT_WIDGET_HEIGHT,
            })
    }

    fn next_free_y(&self) -> i32 {
        self.layouts
            .get(CANONICAL_BREAKPOINT)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| entry.y + entry.h)
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    fn persist(&self) {
        self.adapter.save(&self.scope, &self.widgets, &self.layouts);
    }
}

#[cfg(test)]
mod tests {
    use super::{DashboardEngine, DEFAULT_WIDGET_HEIGHT};
    use crate::errors::AppResult;
    use crate::models::{ChartType, Layouts, MetricKind, WidgetDraft, CANONICAL_BREAKPOINT};
    use crate::persistence::{DashboardScope, KeyValueStore};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MemoryStore {
        values: Mutex<HashMap<String, String>>,
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> AppResult<Option<String>> {
            Ok(self.values.lock().expect("store lock").get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> AppResult<()> {
            self.values
                .lock()
                .expect("store lock")
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    fn draft(title: &str) -> WidgetDraft {
        WidgetDraft {
            title: title.to_string(),
            chart: ChartType::Bar,
            x_field: "status_contratacao".to_string(),
            y_field: None,
            metric: MetricKind::Count,
            palette: None,
            md: Some(6),
        }
    }

    fn engine_with_store() -> (DashboardEngine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let scope = DashboardScope::new("planejamento", Some("7".to_string()));
        let engine = DashboardEngine::load(store.clone(), scope, &[]);
        (engine, store)
    }

    #[test]
    fn added_widgets_stack_below_existing_placements() {
        let (mut engine, _store) = engine_with_store();
        let first = engine.add_widget(draft("first"));
        let second = engine.add_widget(draft("second"));

        let first_entry = engine.placement_for(&first.id).expect("first placement");
        let second_entry = engine.placement_for(&second.id).expect("second placement");
        assert_eq!(first_entry.y, 0);
        assert_eq!(second_entry.y, DEFAULT_WIDGET_HEIGHT);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn add_then_delete_restores_prior_state() {
        let (mut engine, _store) = engine_with_store();
        engine.add_widget(draft("keep"));
        let before = engine.snapshot();

        let added = engine.add_widget(draft("temporary"));
        engine.delete_widget(&added.id);

        let after = engine.snapshot();
        assert_eq!(after.widgets, before.widgets);
        assert_eq!(after.layouts, before.layouts);
    }

    #[test]
    fn edit_preserves_order_and_id() {
        let (mut engine, _store) = engine_with_store();
        let a = engine.add_widget(draft("a"));
        let b = engine.add_widget(draft("b"));

        let mut changed = draft("b renamed");
        changed.chart = ChartType::Pie;
        engine.edit_widget(&b.id, changed);

        let widgets = engine.widgets();
        assert_eq!(widgets[0].id, a.id);
        assert_eq!(widgets[1].id, b.id);
        assert_eq!(widgets[1].title, "b renamed");
        assert_eq!(widgets[1].chart, ChartType::Pie);
    }

    #[test]
    fn edit_updates_placement_width_only_when_size_changed() {
        let (mut engine, _store) = engine_with_store();
        let widget = engine.add_widget(draft("sized"));
        let placed = engine.placement_for(&widget.id).expect("placement");
        assert_eq!(placed.w, 6);

        let mut wider = draft("sized");
        wider.md = Some(12);
        engine.edit_widget(&widget.id, wider);
        let replaced = engine.placement_for(&widget.id).expect("placement");
        assert_eq!(replaced.w, 12);
        assert_eq!(replaced.y, placed.y);
    }

    #[test]
    fn unknown_ids_are_no_ops_and_do_not_write() {
        let (mut engine, store) = engine_with_store();
        engine.add_widget(draft("only"));
        let before = engine.snapshot();
        let stored_before = store.values.lock().expect("store lock").clone();

        engine.delete_widget("missing-id");
        engine.edit_widget("missing-id", draft("unused"));

        assert_eq!(engine.snapshot().widgets, before.widgets);
        assert_eq!(engine.snapshot().layouts, before.layouts);
        // delete of an unknown id must not even touch the store
        let stored_after = store.values.lock().expect("store lock").clone();
        assert_eq!(
            stored_after.get(&engine.scope().widgets_key()),
            stored_before.get(&engine.scope().widgets_key())
        );
    }

    #[test]
    fn layout_change_replaces_layouts_without_touching_widgets() {
        let (mut engine, _store) = engine_with_store();
        let widget = engine.add_widget(draft("movable"));

        let mut moved: Layouts = engine.layouts().clone();
        if let Some(entries) = moved.get_mut(CANONICAL_BREAKPOINT) {
            entries[0].x = 6;
            entries[0].y = 4;
        }
        engine.apply_layout_change(moved.clone());

        assert_eq!(engine.layouts(), &moved);
        assert_eq!(engine.widgets().len(), 1);
        assert_eq!(engine.widgets()[0].id, widget.id);
    }

    #[test]
    fn state_survives_reload_from_the_same_store() {
        let store = Arc::new(MemoryStore::default());
        let scope = DashboardScope::new("planejamento", Some("7".to_string()));

        let mut engine = DashboardEngine::load(store.clone(), scope.clone(), &[]);
        let widget = engine.add_widget(draft("durable"));

        let reloaded = DashboardEngine::load(store, scope, &[]);
        assert_eq!(reloaded.widgets().len(), 1);
        assert_eq!(reloaded.widgets()[0].id, widget.id);
        assert!(reloaded.placement_for(&widget.id).is_some());
    }

    #[test]
    fn widget_without_layout_entry_gets_indexed_default_placement() {
        let (mut engine, _store) = engine_with_store();
        engine.add_widget(draft("first"));
        let second = engine.add_widget(draft("second"));

        // Drop every stored placement, simulating a lost layouts key.
        engine.apply_layout_change(crate::models::empty_layouts());

        let placement = engine.placement_for(&second.id).expect("placement");
        assert_eq!(placement.y, DEFAULT_WIDGET_HEIGHT);
        assert_eq!(placement.w, 6);
    }
}
