//! Tessa Control - CLI client for the technique catalog
//!
//! Browse, inspect and get guided recommendations from the technique
//! catalog. All catalog access goes through `tessa_common`.

pub mod commands;
pub mod display;
pub mod query;
pub mod wizard_ui;
