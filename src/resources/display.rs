use bevy::prelude::*;

/// Sentinel for "no selection" / "no progress bar".
pub const INVALID_POS: i32 = -1;

/// Number of entries in the HUD color cycle.
pub const COLOR_COUNT: usize = 9;

/// Resource holding the HUD display state: the title/text lines shown for
/// the current selection, the production progress bar, and the color the
/// selection markers cycle through.
///
/// Pure value object - rendering is the HUD plugin's job, persistence the
/// save plugin's.
#[derive(Resource, Debug, Clone)]
pub struct Display {
    pub title: String,
    pub text: String,
    pub info_text: String,
    /// Production progress 0..=100, or [`INVALID_POS`] for no bar.
    pub progress_bar: i32,
    /// Index of the selected command cell, or [`INVALID_POS`].
    pub down_selected_pos: i32,
    colors: [Vec4; COLOR_COUNT],
    current_color: usize,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            info_text: String::new(),
            progress_bar: INVALID_POS,
            down_selected_pos: INVALID_POS,
            colors: [
                Vec4::new(1.0, 1.0, 1.0, 1.0),
                Vec4::new(1.0, 0.5, 0.5, 1.0),
                Vec4::new(0.5, 0.5, 1.0, 1.0),
                Vec4::new(0.5, 1.0, 0.5, 1.0),
                Vec4::new(0.0, 0.0, 0.0, 1.0),
                Vec4::new(0.0, 0.0, 1.0, 1.0),
                Vec4::new(1.0, 0.0, 0.0, 1.0),
                Vec4::new(0.0, 1.0, 0.0, 1.0),
                Vec4::new(1.0, 1.0, 1.0, 1.0),
            ],
            current_color: 0,
        }
    }
}

impl Display {
    /// The active selection-marker color.
    ///
    /// # Panics
    /// Panics if the color index was corrupted out of range - a programming
    /// error, since [`Display::switch_color`] is the only mutator.
    pub fn color(&self) -> Vec4 {
        assert!(
            self.current_color < COLOR_COUNT,
            "current_color {} >= COLOR_COUNT",
            self.current_color
        );
        self.colors[self.current_color]
    }

    pub fn current_color(&self) -> usize {
        self.current_color
    }

    /// Restores a color index from a save; clamps corrupt values to 0.
    pub fn set_current_color(&mut self, index: usize) {
        self.current_color = if index < COLOR_COUNT { index } else { 0 };
    }

    /// Advances to the next color in the cycle.
    pub fn switch_color(&mut self) {
        self.current_color = (self.current_color + 1) % COLOR_COUNT;
    }

    /// Resets everything except the color cycle position.
    pub fn clear(&mut self) {
        self.title.clear();
        self.text.clear();
        self.info_text.clear();
        self.progress_bar = INVALID_POS;
        self.down_selected_pos = INVALID_POS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display_is_cleared() {
        let display = Display::default();
        assert!(display.title.is_empty());
        assert_eq!(display.progress_bar, INVALID_POS);
        assert_eq!(display.down_selected_pos, INVALID_POS);
        assert_eq!(display.current_color(), 0);
    }

    #[test]
    fn test_switch_color_wraps() {
        let mut display = Display::default();
        for _ in 0..COLOR_COUNT {
            display.switch_color();
        }
        assert_eq!(display.current_color(), 0);
    }

    #[test]
    fn test_clear_keeps_color_cycle() {
        let mut display = Display::default();
        display.title = "Barracks".to_string();
        display.progress_bar = 42;
        display.switch_color();

        display.clear();
        assert!(display.title.is_empty());
        assert_eq!(display.progress_bar, INVALID_POS);
        assert_eq!(display.current_color(), 1);
    }

    #[test]
    fn test_set_current_color_clamps_corrupt_index() {
        let mut display = Display::default();
        display.set_current_color(COLOR_COUNT + 5);
        assert_eq!(display.current_color(), 0);
        display.set_current_color(3);
        assert_eq!(display.current_color(), 3);
    }
}
