//! Composer entries for the Windows Explorer context menu: target
//! classification, menu population, command resolution and launch.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

/// Console front end.
pub mod cli;
/// Fixed names, template tokens and host error codes.
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
