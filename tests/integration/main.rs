//! Integration tests for page-harvest
//!
//! These tests run the complete extraction pipeline over realistic pages
//! and check the serialized payload consumed by the storage collaborators.

mod news_page;
mod output_shape;
