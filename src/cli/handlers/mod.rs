// src/cli/handlers/mod.rs

/// Setup shared by every action.
pub mod commons;
/// `invoke`: run an entry.
pub mod invoke;
/// `menu`: print the menu for a selection.
pub mod menu;
/// `resolve`: print what an entry would launch.
pub mod resolve;
/// `toggle-admin`: flip elevation-on-write.
pub mod toggle_admin;
