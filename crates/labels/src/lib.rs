//! `labelforge-labels`: the sticker domain. Products, production dates, batch
//! numbers, sticker assembly, print-job records and interactive selections.
//!
//! Pure logic only; storage and rendering live in other crates.

pub mod batch;
pub mod dates;
pub mod print_job;
pub mod product;
pub mod selection;
pub mod sticker;

pub use batch::{BatchNumber, batch_prefix, sequence_key};
pub use dates::ProductionDates;
pub use print_job::{NewPrintJob, PrintJob};
pub use product::Product;
pub use selection::{Selection, SelectionItem};
pub use sticker::{
    MAX_STICKERS_PER_REQUEST, PrintLine, Quantity, Sticker, StickerBatch, total_stickers,
};
