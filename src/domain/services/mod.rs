mod route_table;

pub use route_table::{RouteTable, FEATURE_FALLBACK_PATH, LOGIN_PATH};
