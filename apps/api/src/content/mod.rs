pub mod slug;

/// Route prefix under which individual devotionals are served.
pub const CONTENT_ROUTE_PREFIX: &str = "/devotional/";
