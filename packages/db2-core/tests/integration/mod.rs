//! Integration tests over on-disk data directories.
//!
//! 1. Loading: registry, locales, version checks, startup sequence
//! 2. Hotfixes: push ordering and record removal
//! 3. Queries: curves, bonus trees, UI maps and cross references

pub mod helpers;
pub mod hotfix_tests;
pub mod load_tests;
pub mod query_tests;
