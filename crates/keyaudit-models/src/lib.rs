//! Model discovery and relationship extraction.
//!
//! Models are manifest files under a model root. Each manifest declares
//! whether it is a concrete persistent entity and lists its typed
//! relationships; the extractor turns those into relationship records.

pub mod decode;
pub mod discover;
pub mod extract;
pub mod files;
pub mod manifest;

pub use decode::{DecodeError, ManifestDecoder, ModelDecoder};
pub use discover::{Discoverer, Discovery, ModelDescriptor, canonical_name};
pub use extract::{ENTRY_POINT, Extraction, extract};
pub use files::{EntryKind, FileLister, FsLister, Listing};
pub use manifest::{ModelManifest, RelationDecl};
