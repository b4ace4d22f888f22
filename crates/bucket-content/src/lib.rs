//! Decoded content accessors for bucketfs handles
//!
//! Listing handles only carry paths and metadata. The extension traits here
//! read through a handle and decode its contents by type:
//!
//! - [`JsonFileExt`] for JSON documents
//! - [`YamlFileExt`] for YAML documents
//! - [`ImageExt`] for image headers
//!
//! ```rust,no_run
//! use bucket_content::JsonFileExt;
//! use bucket_fs::{BoundedFilesystem, FilesystemConfig, MemoryAdapter};
//!
//! let fs = BoundedFilesystem::new(MemoryAdapter::new(), FilesystemConfig::default());
//! for handle in fs.list_contents("config", false)? {
//!     if let Some(json) = handle.as_json() {
//!         println!("{}: {}", json.path(), json.parse()?);
//!     }
//! }
//! # Ok::<(), bucket_content::Error>(())
//! ```

pub mod error;
pub mod image;
pub mod json;
pub mod yaml;

pub use error::{Error, Result};
pub use self::image::{ImageExt, ImageInfo};
pub use json::JsonFileExt;
pub use yaml::YamlFileExt;
