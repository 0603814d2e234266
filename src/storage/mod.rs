pub mod blobs;

pub use blobs::{BlobStore, FsBlobStore};
