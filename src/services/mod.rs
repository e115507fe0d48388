pub mod archive_decoder;
pub mod catalog_store;
pub mod content_filter;
pub mod filename_parser;

pub use archive_decoder::{decode, list_nested_archives};
pub use catalog_store::{CatalogStore, JsonDirStore, KeyValueStore, MemoryStore};
pub use content_filter::is_text_source;
pub use filename_parser::extract;
