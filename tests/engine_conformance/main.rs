//! Engine Conformance Tests
//!
//! End-to-end behaviour of the entity engine through its public surface:
//! - Name normalization and registry identity
//! - Single-flight provisioning under concurrency
//! - Loose entities, filters, options and validation on the CRUD path
//! - Classification of free-form agent replies

mod common;

mod classifier;
mod crud;
mod normalization;
mod provisioning;
mod scenario;
