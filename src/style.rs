use crossterm::style::{Color, Stylize};

// ── Colour constants ──────────────────────────────────────────────────
pub const COLOR_PASS: Color = Color::Green;
pub const COLOR_FAIL: Color = Color::Red;
pub const COLOR_WARN: Color = Color::Yellow;
pub const COLOR_SKIP: Color = Color::DarkGrey;

// ── Marker constants ──────────────────────────────────────────────────
pub const MARK_OK: &str = "OK";
pub const MARK_FAIL: &str = "FAIL";
pub const MARK_WARN: &str = "WARN";
pub const MARK_SOFT_FAIL: &str = "WARN (continuing)";
pub const MARK_SKIP: &str = "SKIP";

// ── Helpers ───────────────────────────────────────────────────────────

/// Colour `text` when `enabled`, otherwise return it unchanged.
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.with(color).bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn ok(enabled: bool) -> String {
    paint(MARK_OK, COLOR_PASS, enabled)
}

pub fn fail(enabled: bool) -> String {
    paint(MARK_FAIL, COLOR_FAIL, enabled)
}

pub fn warn(enabled: bool) -> String {
    paint(MARK_WARN, COLOR_WARN, enabled)
}

pub fn soft_fail(enabled: bool) -> String {
    paint(MARK_SOFT_FAIL, COLOR_WARN, enabled)
}

pub fn skip(enabled: bool) -> String {
    paint(MARK_SKIP, COLOR_SKIP, enabled)
}
