// src/core/mod.rs

//! The menu engine. Nothing here talks to the OS directly; every host
//! capability comes in through the traits in `system`.

pub mod catalog;
pub mod command_resolver;
pub mod handler;
pub mod menu_builder;
pub mod preferences;
pub mod shell_item;
pub mod target_resolver;
