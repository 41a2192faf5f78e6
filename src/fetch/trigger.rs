//! Next-page trigger policy.

/// How many viewport heights of unseen content may remain before the next
/// page is requested.
pub const PREFETCH_SCREENS: f64 = 2.5;

/// Evaluated once per drag end.
///
/// `viewport_height` is the visible height, `content_height` the total
/// scrollable height and `target_offset` the projected resting offset of the
/// gesture. Redundant `true`s are harmless because the controller ignores
/// requests while a fetch is outstanding.
pub fn should_load_next_page(
    viewport_height: f64,
    content_height: f64,
    target_offset: f64,
    screens: f64,
) -> bool {
    content_height - viewport_height - target_offset <= screens * viewport_height
}
