//! Content records and their persisted form
//!
//! Records are schema-less field maps. They persist as one module file per
//! slug, rendered by [`to_module`] and read back by [`from_module`].

mod fields;
mod module;
mod record;
mod slug;

pub use fields::{
    UPLOADS_PREFIX, humanize_field_name, is_asset_field, is_asset_value, sanitize_field_name,
};
pub use module::{TYPE_ALIAS, from_module, from_module_bytes, to_module};
pub use record::{ContentItem, ContentRecord, FieldValue, MAX_NESTING_DEPTH};
pub use slug::{CONTENT_EXTENSION, Slug};
