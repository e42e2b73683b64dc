//! Static microsite generator for reelsite.
//!
//! Renders a home page and one page per video from normalized video data,
//! with schema.org structured data, generated assets and JSON manifests.

pub mod assets;
pub mod builder;
pub mod schema;
pub mod templates;

pub use builder::{build_manifest, BuildConfig, BuildError, BuildManifest, BuildResult, StaticBuilder};
