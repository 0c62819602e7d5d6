//! Analytics and favorites for the children's and teenagers' devotional site.
//!
//! Client side: [`tracker::Tracker`] (sessions, page views, events) and
//! [`favorites::FavoritesStore`] (local bookmarks), both written against the
//! capability traits in [`storage`] and [`tracker::sink`] / [`tracker::beacon`].
//!
//! Server side: the ingest service in [`routes`] / [`analytics`] that receives
//! those records, including the unload beacon, and serves dashboard rollups.

pub mod analytics;
pub mod clock;
pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod favorites;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;
pub mod tracker;
