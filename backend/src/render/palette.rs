//! Colours used by rendered entities
//!
//! Kept free of any graphics crate so the renderer stays backend agnostic.

use serde::{Deserialize, Serialize};

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(255, 255, 255);

/// Completed tasks
pub const SUCCESS: Rgb = Rgb(0, 128, 0);
/// Missed tasks
pub const FAILURE: Rgb = Rgb(255, 0, 0);
/// Pending (and not yet active) tasks
pub const NEUTRAL: Rgb = Rgb(0, 0, 255);
/// Leader banner text
pub const ALERT: Rgb = Rgb(220, 0, 0);

/// Categorical palette, cycled by agent index
pub const AGENT_COLORS: [Rgb; 10] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
    Rgb(227, 119, 194),
    Rgb(127, 127, 127),
    Rgb(188, 189, 34),
    Rgb(23, 190, 207),
];

/// Stable colour for agent `index`
pub fn agent_color(index: usize) -> Rgb {
    AGENT_COLORS[index % AGENT_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_colors_cycle() {
        assert_eq!(agent_color(0), agent_color(10));
        assert_ne!(agent_color(0), agent_color(1));
    }
}
