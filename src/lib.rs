//! linkshelf: a personal bookmark shelf.
//!
//! Saved links are tagged with the platform they come from, completed with
//! title/description/thumbnail fetched from the web, and can be moved in and
//! out as JSON, CSV or Netscape bookmark HTML.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
