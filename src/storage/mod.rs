//! # Object Storage
//!
//! Durable storage for card photos, packaging archives, and rendered card
//! faces. Uploads overwrite any existing object at the same path and resolve
//! to a public URL that is safe to denormalize into card rows.
//!
//! ## Key Components
//!
//! - [`ObjectStorage`] - the seam the workflow depends on
//! - [`HttpObjectStore`] - bucket REST API implementation
//! - [`MemoryObjectStore`] - in-process test double
//! - [`paths`] - deterministic object paths per asset kind

pub mod http_store;
pub mod memory;

pub use http_store::HttpObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;

/// Errors surfaced by object storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Storage rejected upload of {path}: {status} {message}")]
    Rejected {
        path: String,
        status: u16,
        message: String,
    },
}

/// Durable object storage reachable from the workflow.
///
/// Implementations must overwrite an existing object at the same path and
/// return the public URL of the stored object.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `bytes` to `path`, overwriting any existing object
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Public URL an object at `path` resolves to
    fn public_url(&self, path: &str) -> String;
}

/// Deterministic object paths per asset kind
pub mod paths {
    use crate::render::CardSide;

    /// Employee photo, keyed by employee code
    pub fn photo(employee_code: &str, content_type: &str) -> String {
        let ext = match content_type {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        };
        format!("photos/{employee_code}.{ext}")
    }

    /// Packaging archive, keyed by employee code
    pub fn archive(employee_code: &str) -> String {
        format!("archives/{employee_code}.zip")
    }

    /// Rendered card face uploaded during vendor dispatch
    pub fn dispatch_image(batch_ref: &str, row_index: usize, side: CardSide) -> String {
        format!("public/bulk-{batch_ref}-{row_index}-{side}.png")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_dispatch_image_path() {
            assert_eq!(
                dispatch_image("B-00007", 3, CardSide::Front),
                "public/bulk-B-00007-3-front.png"
            );
            assert_eq!(
                dispatch_image("B-00007", 3, CardSide::Back),
                "public/bulk-B-00007-3-back.png"
            );
        }

        #[test]
        fn test_asset_paths() {
            assert_eq!(photo("E100", "image/png"), "photos/E100.png");
            assert_eq!(photo("E100", "image/jpeg"), "photos/E100.jpg");
            assert_eq!(archive("E100"), "archives/E100.zip");
        }
    }
}
