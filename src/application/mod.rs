//! Content pipeline: extraction, rendering, enrichment and aggregation.

pub mod catalog;
pub mod enrichment;
pub mod error;
pub mod frontmatter;
pub mod reading_time;
pub mod render;
pub mod repos;
