//! Marker and label colors.

use owo_colors::Style;

/// Colors for the progress markers and result labels.
///
/// `Palette::default()` is the plain palette: every style is a no-op.
#[derive(Default, Clone, Copy)]
pub struct Palette {
    /// `→` in-progress marker.
    pub step: Style,
    /// `✓` completion marker.
    pub ok: Style,
    /// `⚠` marker for best-effort failures.
    pub warn: Style,
    /// Result labels on stdout.
    pub key: Style,
    pub banner: Style,
}

impl Palette {
    /// Colored palette when `enabled`, plain otherwise.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self::default();
        }
        Self {
            step: Style::new().cyan(),
            ok: Style::new().green(),
            warn: Style::new().yellow().bold(),
            key: Style::new().dimmed(),
            banner: Style::new().bold().cyan(),
        }
    }
}
