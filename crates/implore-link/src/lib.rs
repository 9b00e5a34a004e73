//! implore-link - Linked selection across coordinated views
//!
//! This crate keeps several views of one catalogue (parallel coordinates,
//! scatter plots, ranked tables) consistent with each other. Views report
//! user gestures to a [`LinkEngine`] and render from its outputs.
//!
//! # Key Components
//!
//! - **EntityStore**: Records keyed by id, with per-attribute summaries
//! - **AxisFilterSet**: Range brushes and tri-state missing-value toggles
//! - **Selection**: Records passing every active filter
//! - **ColorScale**: One color encoding shared by every view
//! - **HighlightCoordinator**: Single focused entity under the pointer
//! - **Ordering**: Display order for ranked lists
//! - **Sync**: Outbound selection payloads and inbound pre-filters
//!
//! # Missing values
//!
//! Every attribute value is a number, text, or missing. Missing values never
//! fail a range test on their own; each axis decides through its
//! [`MissingMode`] whether they pass.

pub mod color_scale;
pub mod colormap;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod observer;
pub mod ordering;
pub mod selection;
pub mod store;
pub mod sync;
pub mod value;

pub use color_scale::{ColorScale, DomainSide, Legend, LegendEntry, ScaleDomain, ScaleKind};
pub use colormap::{builtin_colormap_names, Color, Colormap};
pub use config::{ColorConfig, LinkConfig, SyncConfig};
pub use engine::{BrushEvent, LinkEngine};
pub use error::{LinkError, LinkResult, SyncError, SyncResult};
pub use filter::{AxisFilter, AxisFilterSet, MissingMode};
pub use highlight::{HighlightCoordinator, HighlightEvent};
pub use observer::SubscriptionId;
pub use ordering::{compare_for_display, sort_for_display, TableSort};
pub use selection::Selection;
pub use store::{AttributeKind, AttributeSummary, EntityId, EntityStore, Record};
pub use sync::{SelectionPublisher, SelectionSyncPayload, SelectionSyncQueue, SyncStats};
pub use value::Value;
