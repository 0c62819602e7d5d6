// Server side of the analytics pipeline: record ingest (including the unload
// beacon), daily rollups and the admin dashboard summary/export.

pub mod export;
pub mod handlers;
pub mod ingest;
pub mod stats;
pub mod store;
