//! Undo/redo history and change broadcast for the collaborative drawing board.
//!
//! This crate is compiled to WebAssembly and runs in the browser next to the
//! host's vector-graphics library. It owns everything about an edit except
//! drawing it: giving each primitive a stable identity, recording local edits
//! as reversible change records, undoing and redoing them through the
//! rendering surface, and turning edits into wire messages for peers (and
//! peers' messages back into surface edits that bypass the local history).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`]: the engine instance the UI holds |
//! | [`history`] | Change records, history log, and redo buffer |
//! | [`identity`] | Stable identities and the identity registry |
//! | [`kinds`] | Kind-tag to reconstructor table |
//! | [`sync`] | Broadcasters and wire-message translation |
//! | [`surface`] | The rendering-surface contract |
//! | [`doc`] | Primitive kinds, property bags, and an in-memory surface |
//! | [`input`] | Tools, tool settings, selection, and key commands |
//! | [`wasm`] | `wasm-bindgen` wrapper for the JavaScript host |
//! | [`consts`] | Shared constants (toolbar defaults, identity format) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod history;
pub mod identity;
pub mod input;
pub mod kinds;
pub mod surface;
pub mod sync;
pub mod wasm;
