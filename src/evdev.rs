//! Linux input-event bitmask parsing and classification constants.
//!
//! Mirrors the subset of `<linux/input-event-codes.h>` needed to classify an
//! `input` subsystem device from its `EV`/`ABS`/`REL`/`KEY`/`PROP` uevent
//! capability strings.

pub const EV_KEY: u32 = 0x01;
pub const EV_REL: u32 = 0x02;
pub const EV_ABS: u32 = 0x03;
pub const EV_SW: u32 = 0x05;

pub const REL_X: u32 = 0x00;
pub const REL_Y: u32 = 0x01;

pub const ABS_X: u32 = 0x00;
pub const ABS_Y: u32 = 0x01;
pub const ABS_Z: u32 = 0x02;

pub const KEY_ESC: u32 = 1;
pub const KEY_ENTER: u32 = 28;

pub const BTN_MISC: u32 = 0x100;
pub const BTN_MOUSE: u32 = 0x110;
pub const BTN_JOYSTICK: u32 = 0x120;
pub const BTN_TL: u32 = 0x136;
pub const BTN_TR: u32 = 0x137;
pub const BTN_SELECT: u32 = 0x13a;
pub const BTN_START: u32 = 0x13b;
pub const BTN_TOOL_PEN: u32 = 0x140;
pub const BTN_TOOL_FINGER: u32 = 0x145;
pub const BTN_TOUCH: u32 = 0x14a;
pub const BTN_STYLUS: u32 = 0x14b;

pub const INPUT_PROP_POINTING_STICK: u32 = 0x05;
pub const INPUT_PROP_ACCELEROMETER: u32 = 0x06;

/// Number of bits in one bitmask word.
const WORD_BITS: u32 = u64::BITS;

/// Parses a capability string (space-separated hex words, most-significant
/// word first) into a little-endian array of bitmask words: the rightmost
/// word in `s` becomes `words[0]`, the next becomes `words[1]`, and so on.
pub fn parse_bit_words(s: &str) -> Vec<u64> {
    s.split_whitespace()
        .rev()
        .map(|word| u64::from_str_radix(word, 16).unwrap_or(0))
        .collect()
}

/// Tests whether `bit` is set in a little-endian bitmask word array produced
/// by [`parse_bit_words`].
pub fn test_bit(words: &[u64], bit: u32) -> bool {
    let word_idx = (bit / WORD_BITS) as usize;
    let mask = 1u64 << (bit % WORD_BITS);
    words.get(word_idx).map(|w| w & mask != 0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bit_words_reverses_word_order() {
        // rightmost hex word -> words[0]
        let words = parse_bit_words("70000 0 0 0 0");
        assert_eq!(words[0], 0);
        assert_eq!(words[4], 0x70000);
    }

    #[test]
    fn test_bit_finds_high_bits() {
        let words = parse_bit_words("70000");
        assert!(test_bit(&words, BTN_MOUSE));
        assert!(!test_bit(&words, BTN_TOOL_PEN));
    }

    #[test]
    fn test_bit_out_of_range_is_false() {
        let words = parse_bit_words("1");
        assert!(!test_bit(&words, 9001));
    }
}
