//! Document sections: catalog, outline composition, render hooks.
//!
//! The registry is constructed once and passed by reference into the
//! composer; nothing here holds mutable state.

pub mod types;
pub mod render;
pub mod registry;
pub mod composer;

pub use types::{OutlineWarning, RenderHook, RenderedSection, SectionDef, SectionKey};
pub use registry::SectionRegistry;
pub use composer::{ComposedOutline, SectionComposer, MANDATORY_SECTIONS};
