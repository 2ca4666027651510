//! Shared constants for the canvas crate.

// ── Property bag ────────────────────────────────────────────────

/// Property-bag key carrying the primitive's kind tag.
pub const KIND_KEY: &str = "type";

// ── Identity ────────────────────────────────────────────────────

/// Prefix of every allocated primitive identity.
pub const IDENTITY_PREFIX: &str = "obj";

/// Hex characters of the random session tag appended to identities.
pub const SESSION_TAG_LEN: usize = 8;

// ── Toolbar defaults ────────────────────────────────────────────

/// Default drawing color.
pub const DEFAULT_COLOR: &str = "#000000";

/// Default pencil stroke width in pixels.
pub const DEFAULT_PENCIL_SIZE: f64 = 2.0;

/// Default eraser stroke width in pixels.
pub const DEFAULT_ERASER_SIZE: f64 = 10.0;

/// Eraser strokes paint opaque white and punch through what is beneath.
pub const ERASER_COLOR: &str = "rgba(255,255,255,1)";

/// Compositing mode applied to eraser strokes.
pub const ERASER_COMPOSITE: &str = "destination-out";

// ── Shape geometry ──────────────────────────────────────────────

/// Radius of a circle added from the toolbar.
pub const CIRCLE_RADIUS: f64 = 50.0;

/// Width and height of a rectangle or triangle added from the toolbar.
pub const SHAPE_SIZE: f64 = 100.0;

/// Path data for a plain line added from the toolbar.
pub const LINE_PATH: &str = "M 0 0 L 100 0";

/// Path data for an arrow added from the toolbar.
pub const ARROW_PATH: &str = "M 0 0 L 100 0 M 80 -10 L 100 0 L 80 10";

/// Placeholder content of a text object added from the toolbar.
pub const DEFAULT_TEXT: &str = "Edit me";

/// Font size of a text object added from the toolbar.
pub const TEXT_FONT_SIZE: f64 = 20.0;
