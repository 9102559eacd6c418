//! Showon support for fields nested inside repeatable subforms

mod name_map;
mod rewrite;
mod source;

pub use name_map::NameMap;
pub use rewrite::ShowOnRewriter;
pub use source::{rewrite_form_source, AttributeRewrite, RewrittenSource};
