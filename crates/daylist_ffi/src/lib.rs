//! Flutter-facing bindings for `daylist_core`.

pub mod api;
