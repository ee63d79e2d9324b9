//! `labelforge-render`: lays stickers out on label sheets and emits PDF bytes.
//!
//! Rendering is pure: the same stickers in the same order always produce the
//! same bytes. Writing the document anywhere is the caller's job.

pub mod layout;
pub mod sheet;
pub mod text;

pub use layout::{SheetLayout, Slot};
pub use sheet::{RenderError, render_stickers};
