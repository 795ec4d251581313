//! Folio: a content pipeline turning authored markdown into locale-scoped,
//! rendered and GitHub-enriched records for a portfolio site.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
