//! LED color state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum value of the red, green and blue channels.
pub const MAX_COLOR: u8 = 255;
/// Maximum value of the brightness channel.
pub const MAX_BRIGHT: u8 = 31;

/// One color channel of an LED.
///
/// The discriminant is the channel's flag index in a 4-bit color bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red = 3,
    Green = 2,
    Blue = 1,
    Bright = 0,
}

impl Channel {
    /// Channels in the order their value fields are emitted.
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Bright];

    /// Flag index in the 4-bit color bitmap.
    pub fn bitmap_index(self) -> u32 {
        self as u32
    }

    /// Largest legal value for this channel.
    pub fn max_value(self) -> u8 {
        match self {
            Channel::Bright => MAX_BRIGHT,
            _ => MAX_COLOR,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::Bright => "bright",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 4-channel LED color: red/green/blue in 0..=255, brightness in 0..=31.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedState {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub bright: u8,
}

impl LedState {
    pub fn new(red: u8, green: u8, blue: u8, bright: u8) -> Self {
        Self {
            red,
            green,
            blue,
            bright,
        }
    }

    /// Value of a single channel.
    pub fn get(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
            Channel::Bright => self.bright,
        }
    }

    /// Signed change of `channel` when moving from `self` to `to`.
    pub fn delta(&self, to: &LedState, channel: Channel) -> i32 {
        i32::from(to.get(channel)) - i32::from(self.get(channel))
    }

    /// Returns the first channel whose value exceeds its legal range.
    pub fn out_of_range_channel(&self) -> Option<Channel> {
        Channel::ALL
            .into_iter()
            .find(|&c| self.get(c) > c.max_value())
    }

    /// `(R + G + B) × Bright`, the simulator's brightness measure.
    pub fn simulator_brightness(&self) -> u32 {
        (u32::from(self.red) + u32::from(self.green) + u32::from(self.blue))
            * u32::from(self.bright)
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.red, self.green, self.blue, self.bright)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_indices_put_red_highest() {
        assert_eq!(Channel::Red.bitmap_index(), 3);
        assert_eq!(Channel::Green.bitmap_index(), 2);
        assert_eq!(Channel::Blue.bitmap_index(), 1);
        assert_eq!(Channel::Bright.bitmap_index(), 0);
    }

    #[test]
    fn delta_is_signed() {
        let from = LedState::new(10, 200, 0, 31);
        let to = LedState::new(50, 100, 0, 0);
        assert_eq!(from.delta(&to, Channel::Red), 40);
        assert_eq!(from.delta(&to, Channel::Green), -100);
        assert_eq!(from.delta(&to, Channel::Blue), 0);
        assert_eq!(from.delta(&to, Channel::Bright), -31);
    }

    #[test]
    fn bright_above_31_is_out_of_range() {
        assert_eq!(LedState::new(255, 255, 255, 31).out_of_range_channel(), None);
        assert_eq!(
            LedState::new(0, 0, 0, 32).out_of_range_channel(),
            Some(Channel::Bright)
        );
    }

    #[test]
    fn simulator_brightness_of_full_white() {
        assert_eq!(LedState::new(255, 255, 255, 31).simulator_brightness(), 23715);
        assert_eq!(LedState::new(255, 0, 0, 0).simulator_brightness(), 0);
    }
}
