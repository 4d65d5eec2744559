//! Core library for the roster-tools command line application.
//!
//! The library turns an event registration workbook into workshop rosters.
//! Sheet access lives under [`io`], the declarative sheet layout in
//! [`schema`], header lookup in [`columns`], cell parsing in [`label`], and
//! the two extraction passes in [`attendees`] and [`collect`]. [`parser`]
//! drives them end to end. [`timeslot`] validates schedule grids and does not
//! depend on the rest of the crate.

pub mod attendees;
pub mod collect;
pub mod columns;
pub mod dump;
pub mod error;
pub mod export;
pub mod io;
pub mod label;
pub mod logging;
pub mod model;
pub mod parser;
pub mod schema;
pub mod timeslot;

pub use error::{Result, RosterError};
pub use parser::ExcelParser;
