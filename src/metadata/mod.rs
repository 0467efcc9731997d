//! Structured data extraction module.
//!
//! JSON-LD blocks and HTML microdata item types, the two structured-data
//! sources consumed by the schema and entity pillars.

pub mod json_ld;
pub mod microdata;

pub use json_ld::{collect_json_ld, collect_json_ld_from_html, JsonLdNode};
pub use microdata::microdata_types;
