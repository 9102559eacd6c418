//! Conditional visibility ("showon") for custom form fields
//!
//! A field may declare a showon expression such as `color:red[OR]color:blue`.
//! When every field the expression refers to is on the form, the renderer
//! evaluates it on the client. When a referenced field is missing, the
//! decision has to be made on the server: the field is either always shown
//! (its expression is cleared) or removed. [`reconcile()`] repeats this until
//! the form stops changing.
//!
//! Fields inside repeatable subforms are renamed by the host; [`subform`]
//! rewrites the expressions of a subform definition to the synthetic names.

pub mod config;
pub mod error;
pub mod events;
pub mod form;
pub mod reconcile;
pub mod showon;
pub mod snapshot;
pub mod subform;

pub use config::PluginConfig;
pub use error::{ExpressionFault, Result, ShowOnError};
pub use events::{PreparationContext, ShowOnPlugin};
pub use reconcile::{reconcile, ReconcileReport, Resolution};
