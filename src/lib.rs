//! Migration of ECAS study datasets into the LabCAS archive.
//!
//! A run loads the EDRN reference vocabularies once, then for every selected
//! dataset directory maps the product type metadata to a collection
//! configuration, extracts per-file metadata, and copies each product file
//! next to a sidecar metadata document.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod mapper;
pub mod normalize;
pub mod output;
pub mod store;
pub mod vocabulary;
pub mod xml;
