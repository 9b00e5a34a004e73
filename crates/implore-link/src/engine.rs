//! The linked-views engine
//!
//! One [`LinkEngine`] owns a record store, its filters and everything
//! derived from them. Views feed it brush and pointer events and subscribe
//! to its outputs; they never talk to each other directly.
//!
//! Every mutation recomputes synchronously before returning:
//!
//! 1. selection over the visible records
//! 2. color scale, when the visible set changed or the scale follows the
//!    selection
//! 3. observer callbacks, then the external publisher
//!
//! Observers only ever see a fully consistent state.

use std::collections::BTreeSet;

use crate::color_scale::{ColorScale, DomainSide, Legend};
use crate::colormap::{Color, Colormap};
use crate::config::LinkConfig;
use crate::error::LinkResult;
use crate::filter::{AxisFilterSet, MissingMode};
use crate::highlight::{HighlightCoordinator, HighlightEvent};
use crate::observer::{Listeners, SubscriptionId};
use crate::ordering::TableSort;
use crate::selection::{self, Selection};
use crate::store::{EntityId, EntityStore, Record};
use crate::sync::{SelectionPublisher, SelectionSyncPayload};

/// One brush gesture from a view
#[derive(Debug, Clone, PartialEq)]
pub enum BrushEvent {
    /// Range brush moved or released; `None` clears the range
    Range {
        attribute: String,
        range: Option<(f64, f64)>,
    },
    /// Click on the missing-value toggle of an axis
    CycleMissing { attribute: String },
}

impl BrushEvent {
    pub fn range(attribute: impl Into<String>, low: f64, high: f64) -> Self {
        BrushEvent::Range {
            attribute: attribute.into(),
            range: Some((low, high)),
        }
    }

    pub fn clear(attribute: impl Into<String>) -> Self {
        BrushEvent::Range {
            attribute: attribute.into(),
            range: None,
        }
    }

    pub fn cycle_missing(attribute: impl Into<String>) -> Self {
        BrushEvent::CycleMissing {
            attribute: attribute.into(),
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            BrushEvent::Range { attribute, .. } | BrushEvent::CycleMissing { attribute } => {
                attribute
            }
        }
    }
}

/// Cross-view linked-selection engine for one catalogue
pub struct LinkEngine {
    config: LinkConfig,
    colormap: Colormap,
    no_data: Color,

    store: EntityStore,
    filters: AxisFilterSet,
    selection: Selection,
    /// Inbound pre-filter from the external process
    external: Option<BTreeSet<EntityId>>,
    /// Attribute of the brush drag in progress
    gesture: Option<String>,

    color_attribute: Option<String>,
    restrict_color: bool,
    color_scale: Option<ColorScale>,

    highlight: HighlightCoordinator,
    publisher: Option<Box<dyn SelectionPublisher>>,

    selection_listeners: Listeners<Selection>,
    highlight_listeners: Listeners<HighlightEvent>,
    color_listeners: Listeners<ColorScale>,
}

impl LinkEngine {
    /// Create an engine for a record store
    pub fn new(config: LinkConfig, store: EntityStore) -> LinkResult<Self> {
        config.validate()?;
        let colormap = config.color.resolve_colormap()?;
        let no_data = config.color.resolve_no_data()?;

        let mut engine = Self {
            colormap,
            no_data,
            filters: AxisFilterSet::for_store(&store),
            store,
            selection: Selection::default(),
            external: None,
            gesture: None,
            color_attribute: config.color.attribute.clone(),
            restrict_color: config.color.restrict_to_selection,
            color_scale: None,
            highlight: HighlightCoordinator::new(),
            publisher: None,
            selection_listeners: Listeners::new(),
            highlight_listeners: Listeners::new(),
            color_listeners: Listeners::new(),
            config,
        };
        engine.selection = selection::compute(engine.visible_records(), &engine.filters);
        engine.color_scale = engine.derive_color_scale();
        Ok(engine)
    }

    /// Swap in a freshly loaded record store
    ///
    /// Filters, gesture and external restriction are dropped; a held focus
    /// is released with a `Left` broadcast.
    pub fn replace_store(&mut self, store: EntityStore) {
        self.filters = AxisFilterSet::for_store(&store);
        self.store = store;
        self.external = None;
        self.gesture = None;

        let events = self.highlight.leave();
        self.broadcast_highlight(&events);

        self.recompute(true);
    }

    // MARK: - Brushing

    /// Apply one brush event; returns whether filter state changed
    pub fn apply(&mut self, event: BrushEvent) -> bool {
        match event {
            BrushEvent::Range { attribute, range } => match range {
                Some((low, high)) => self.set_range(&attribute, low, high),
                None => self.clear_range(&attribute),
            },
            BrushEvent::CycleMissing { attribute } => {
                self.cycle_missing_mode(&attribute).is_some()
            }
        }
    }

    /// Set the range brush of an attribute
    ///
    /// Refused while a gesture on another attribute is in progress.
    pub fn set_range(&mut self, attribute: &str, low: f64, high: f64) -> bool {
        if !self.gesture_allows(attribute) {
            return false;
        }
        let changed = self.filters.set_range(attribute, low, high);
        if changed {
            self.recompute(false);
        }
        changed
    }

    /// Remove the range brush of an attribute
    ///
    /// Refused while a gesture on another attribute is in progress.
    pub fn clear_range(&mut self, attribute: &str) -> bool {
        if !self.gesture_allows(attribute) {
            return false;
        }
        let changed = self.filters.clear_range(attribute);
        if changed {
            self.recompute(false);
        }
        changed
    }

    /// Advance the missing-value toggle of an attribute
    pub fn cycle_missing_mode(&mut self, attribute: &str) -> Option<MissingMode> {
        let mode = self.filters.cycle_missing_mode(attribute);
        if mode.is_some() {
            self.recompute(false);
        }
        mode
    }

    /// Drop every brush
    pub fn clear_all_filters(&mut self) {
        self.gesture = None;
        if self.filters.is_empty() {
            return;
        }
        self.filters.clear_all();
        self.recompute(false);
    }

    /// Start a brush drag on an attribute
    ///
    /// Only one drag may be in progress; returns `false` while another
    /// attribute is being brushed.
    pub fn begin_gesture(&mut self, attribute: &str) -> bool {
        match &self.gesture {
            Some(active) if active != attribute => false,
            _ => {
                self.gesture = Some(attribute.to_string());
                true
            }
        }
    }

    /// Finish the current brush drag
    pub fn end_gesture(&mut self) {
        self.gesture = None;
    }

    /// Attribute of the drag in progress
    pub fn gesture(&self) -> Option<&str> {
        self.gesture.as_deref()
    }

    fn gesture_allows(&self, attribute: &str) -> bool {
        match &self.gesture {
            Some(active) if active != attribute => {
                tracing::debug!(
                    attribute,
                    gesture = %active,
                    "Ignoring brush outside the active gesture"
                );
                false
            }
            _ => true,
        }
    }

    // MARK: - Color

    /// Choose the attribute to color by
    pub fn set_color_attribute(&mut self, attribute: impl Into<String>) {
        self.color_attribute = Some(attribute.into());
        self.refresh_color();
    }

    /// Current color-by attribute
    pub fn color_attribute(&self) -> Option<&str> {
        self.color_attribute.as_deref()
    }

    /// Derive the color scale from the selection instead of all visible records
    pub fn set_restrict_color_to_selection(&mut self, restrict: bool) {
        if self.restrict_color == restrict {
            return;
        }
        self.restrict_color = restrict;
        self.refresh_color();
    }

    pub fn restricts_color_to_selection(&self) -> bool {
        self.restrict_color
    }

    /// Stretch one end of a numeric color domain
    pub fn adjust_color_domain(&mut self, side: DomainSide, delta_fraction: f64) -> bool {
        let adjusted = self
            .color_scale
            .as_mut()
            .is_some_and(|scale| scale.adjust_domain(side, delta_fraction));
        if adjusted {
            if let Some(scale) = &self.color_scale {
                self.color_listeners.emit(scale);
            }
        }
        adjusted
    }

    /// Rederive the color scale, discarding manual domain edits
    pub fn reset_color_scale(&mut self) {
        self.refresh_color();
    }

    /// Color for an entity, usable by any view
    pub fn color_of(&self, id: EntityId) -> Color {
        match (&self.color_scale, self.store.get(id)) {
            (Some(scale), Some(record)) => scale.color_of_record(record),
            _ => self.no_data,
        }
    }

    pub fn color_scale(&self) -> Option<&ColorScale> {
        self.color_scale.as_ref()
    }

    /// Legend for the color key widget
    pub fn legend(&self) -> Option<Legend> {
        self.color_scale
            .as_ref()
            .map(|scale| scale.legend(self.config.color.legend_samples))
    }

    // MARK: - Highlight

    /// Pointer entered an entity in some view
    pub fn pointer_enter(&mut self, id: EntityId) {
        if self.store.get(id).is_none() {
            tracing::debug!(id, "Ignoring pointer event for unknown entity");
            return;
        }
        let events = self.highlight.enter(id);
        self.broadcast_highlight(&events);
    }

    /// Pointer left the focused entity
    pub fn pointer_leave(&mut self) {
        let events = self.highlight.leave();
        self.broadcast_highlight(&events);
    }

    /// Currently focused entity
    pub fn focused(&self) -> Option<EntityId> {
        self.highlight.active()
    }

    // MARK: - External sync

    /// Install the outbound selection publisher
    pub fn set_publisher(&mut self, publisher: Box<dyn SelectionPublisher>) {
        self.publisher = Some(publisher);
    }

    /// Disable outbound sync
    pub fn clear_publisher(&mut self) {
        self.publisher = None;
    }

    /// Restrict the visible records to ids chosen by the external process
    ///
    /// An empty collection lifts the restriction.
    pub fn apply_external_filter(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        let ids: BTreeSet<EntityId> = ids.into_iter().collect();
        self.external = if ids.is_empty() { None } else { Some(ids) };
        self.recompute(true);
    }

    /// Remove the external restriction
    pub fn clear_external_filter(&mut self) {
        if self.external.take().is_some() {
            self.recompute(true);
        }
    }

    // MARK: - Subscriptions

    pub fn on_selection_changed<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Selection) + 'static,
    {
        self.selection_listeners.subscribe(callback)
    }

    pub fn on_highlight_changed<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&HighlightEvent) + 'static,
    {
        self.highlight_listeners.subscribe(callback)
    }

    pub fn on_color_scale_changed<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ColorScale) + 'static,
    {
        self.color_listeners.subscribe(callback)
    }

    /// Remove a subscription of any kind
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.selection_listeners.unsubscribe(id)
            || self.highlight_listeners.unsubscribe(id)
            || self.color_listeners.unsubscribe(id)
    }

    // MARK: - Read access

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn filters(&self) -> &AxisFilterSet {
        &self.filters
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Records left after the external pre-filter, in load order
    pub fn visible_records(&self) -> Vec<&Record> {
        match &self.external {
            Some(ids) => self.store.restricted_to(ids),
            None => self.store.records().iter().collect(),
        }
    }

    /// Selected ids in table order
    pub fn sorted_selection(&self, sort: &TableSort) -> Vec<EntityId> {
        let visible = self.visible_records();
        let ids = visible
            .iter()
            .map(|r| r.id)
            .filter(|id| self.selection.contains(*id));
        sort.apply(&self.store, ids)
    }

    // MARK: - Recomputation

    /// Recompute the selection and whatever depends on it
    ///
    /// `visible_changed` forces the color scale to be rederived even when
    /// it does not follow the selection.
    fn recompute(&mut self, visible_changed: bool) {
        self.selection = selection::compute(self.visible_records(), &self.filters);
        self.selection_listeners.emit(&self.selection);

        if visible_changed || self.restrict_color {
            self.refresh_color();
        }

        self.publish_selection();
    }

    fn refresh_color(&mut self) {
        self.color_scale = self.derive_color_scale();
        if let Some(scale) = &self.color_scale {
            self.color_listeners.emit(scale);
        }
    }

    fn derive_color_scale(&self) -> Option<ColorScale> {
        let attribute = self.color_attribute.as_deref()?;
        let visible = self.visible_records();

        let source: Vec<&Record> = if self.restrict_color && self.selection.is_filtered() {
            visible
                .into_iter()
                .filter(|r| self.selection.contains(r.id))
                .collect()
        } else {
            visible
        };

        Some(ColorScale::derive(
            source,
            attribute,
            self.colormap.clone(),
            self.no_data,
        ))
    }

    fn broadcast_highlight(&mut self, events: &[HighlightEvent]) {
        for event in events {
            self.highlight_listeners.emit(event);
        }
    }

    fn publish_selection(&mut self) {
        let Some(publisher) = self.publisher.as_mut() else {
            return;
        };
        let payload = SelectionSyncPayload::from_selection(&self.selection);
        if let Err(e) = publisher.publish(payload) {
            tracing::warn!("Selection sync failed: {}", e);
        }
    }
}

impl std::fmt::Debug for LinkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkEngine")
            .field("records", &self.store.len())
            .field("filters", &self.filters.len())
            .field("selected", &self.selection.len())
            .field("color_attribute", &self.color_attribute)
            .field("focused", &self.highlight.active())
            .field("publisher", &self.publisher.is_some())
            .finish()
    }
}
