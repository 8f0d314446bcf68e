//! # System Interaction Layer
//!
//! The capabilities the core needs from the host, each behind a trait so the
//! menu engine can run against Explorer or against in-memory stand-ins.
//!
//! ## Modules
//!
//! - **`fs`**: file and directory existence checks.
//! - **`fs_items`**: shell items and selections backed by plain paths.
//! - **`native_menu`**: menu primitives and the in-memory `MenuTree`.
//! - **`settings_store`**: the user-scope `settings.toml`.
//! - **`launcher`**: fire-and-forget process launch, with UAC elevation on Windows.
//! - **`elevation`**: whether this process already runs as administrator.

pub mod elevation;
pub mod fs;
pub mod fs_items;
pub mod launcher;
pub mod native_menu;
pub mod settings_store;
