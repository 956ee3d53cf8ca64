//! Optional terminal dashboard over a running [`crate::runner::Runner`],
//! built on [ratatui](https://github.com/ratatui-org/ratatui) in the
//! same style as `aicheye-crustty`'s multi-pane debugger, reduced to a
//! single status pane.
//!
//! - **[`app`]** — application state, render loop, `q`-to-quit handling
//! - **[`theme`]** — color palette shared by the pane
//!
//! [`run_status_view`] is the entry point `hotlisp --watch` calls.

pub mod app;
pub mod theme;

pub use app::{run_status_view, App};
