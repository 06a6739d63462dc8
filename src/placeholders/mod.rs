//! Placeholder contract for report templates.
//!
//! ```text
//! Schema (static tree) → Resolver (flat paths) → Classifier (slug → bundle)
//!                                        ↘ required field set per template
//! ```

pub mod schema;
pub mod classify;
pub mod resolver;

pub use schema::{PlaceholderGroup, SchemaNode};
pub use classify::{classify_template, Classification, TemplateBundle, CLASSIFICATION_RULES};
pub use resolver::{
    data_paths, get_required_placeholders, is_retail_template, list_all_placeholder_paths,
    list_placeholder_paths_by_group, missing_placeholders, required_groups, PlaceholderPath,
};
