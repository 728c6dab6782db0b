// src/specs/mod.rs
//! # Page specs
//!
//! Each spec knows where the data lives in one kind of claims-site page and
//! how to pull it out with the `core::html` scanners. Specs are pure: they
//! take HTML text and return plain structs. Fetching, pagination, caching
//! and resolution live elsewhere.
//!
//! ```text
//! runner → scrape::collect_claims → specs::claims_list::parse  (listing pages)
//!                                 ↘ specs::claim_page::parse    (one per claim)
//! ```
//!
//! Conventions:
//! - Elements are found by tag + class (Drupal's class names are stable);
//!   matching is case-insensitive and tolerant of attribute order.
//! - Text is entity-decoded and whitespace-collapsed; empty text becomes `None`.
//! - Specs are tested offline against small fixtures.
pub mod claim_page;
pub mod claims_list;
