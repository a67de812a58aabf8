use bevy::prelude::*;

/// White text for labels on dark overlays
pub const LABEL_TEXT: Color = Color::srgb(0.95, 0.95, 0.95);

/// White text for headers
pub const HEADER_TEXT: Color = Color::srgb(1.0, 1.0, 1.0);

/// White text for buttons
pub const BUTTON_TEXT: Color = Color::srgb(1.0, 1.0, 1.0);
/// #4caf50
pub const BUTTON_BACKGROUND: Color = Color::srgb(0.298, 0.686, 0.314);
/// #66bb6a
pub const BUTTON_HOVERED_BACKGROUND: Color = Color::srgb(0.4, 0.733, 0.416);
/// #388e3c
pub const BUTTON_PRESSED_BACKGROUND: Color = Color::srgb(0.22, 0.557, 0.235);
