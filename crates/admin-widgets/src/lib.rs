//! Widgets that render and edit admin console fields.
//!
//! A widget turns a field value into an [`Element`] tree for display or
//! editing and turns control events into new [`FieldEdit`] snapshots. The
//! [`WidgetRegistry`] picks the variant for a field from its widget name.

pub mod filter;
pub mod markup;
pub mod registry;
pub mod variants;
pub mod widget;

pub use filter::{FilterControl, FilterKind, FilterOption, FilterRegistry, FilterSelection};
pub use markup::{Element, Node};
pub use registry::{WidgetKind, WidgetRegistry};
pub use widget::{ControlEvent, ControlState, FieldEdit, Widget};
