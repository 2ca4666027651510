//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Service modules own room bookkeeping and fan-out so the route handler can
//! stay focused on socket I/O and wire decoding.

pub mod room;
