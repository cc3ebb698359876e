//! Daily photo publisher library.
//!
//! A sequential batch job that republishes the site's daily photo artifacts:
//! it loads the newest locally-stored photo record, renders the README
//! summary, maintains a bounded date-keyed archive, regenerates the RSS
//! feed, and sweeps raw data files past the retention window.

pub mod archive;
pub mod config;
pub mod feed;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod readme;
pub mod sweep;
