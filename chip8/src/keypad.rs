//! Hexadecimal keypad.
use crate::constants::*;

/// One of the 16 keys of the COSMAC VIP hex keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyCode {
    Key0 = 0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF = 0xF,
}

impl KeyCode {
    pub const ALL: [KeyCode; KEY_COUNT as usize] = [
        Self::Key0,
        Self::Key1,
        Self::Key2,
        Self::Key3,
        Self::Key4,
        Self::Key5,
        Self::Key6,
        Self::Key7,
        Self::Key8,
        Self::Key9,
        Self::KeyA,
        Self::KeyB,
        Self::KeyC,
        Self::KeyD,
        Self::KeyE,
        Self::KeyF,
    ];

    #[inline(always)]
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let key_id = self.as_u8();
        write!(f, "k{key_id:x}")
    }
}

impl From<KeyCode> for u8 {
    fn from(keycode: KeyCode) -> Self {
        keycode.as_u8()
    }
}

impl TryFrom<u8> for KeyCode {
    type Error = InvalidKeyCode;

    fn try_from(key_id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(key_id as usize)
            .copied()
            .ok_or(InvalidKeyCode(key_id))
    }
}

/// Raw key value that falls outside of the keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidKeyCode(pub u8);

impl std::error::Error for InvalidKeyCode {}

impl std::fmt::Display for InvalidKeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "keycode must be in range 0 <= keycode < 16, got {}", self.0)
    }
}

/// Keyboard input state.
///
/// Pressed keys are 1 bits, released keys are 0 bits.
/// Also tracks the `Fx0A` wait, which is only resolved by a key-down edge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Keypad {
    state: u16,
    /// Register waiting to receive the next pressed key.
    wait_target: Option<u8>,
}

impl Keypad {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.state |= 1 << key.as_u8();
        } else {
            self.state &= !(1 << key.as_u8());
        }
    }

    #[inline]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.state & (1 << key.as_u8()) != 0
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any_key(&self) -> bool {
        self.state != 0
    }

    /// Iterate over the keys currently held down, in ascending order.
    pub fn pressed(&self) -> impl Iterator<Item = KeyCode> + '_ {
        KeyCode::ALL.into_iter().filter(|k| self.is_pressed(*k))
    }

    /// Set all keys to up.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.state = 0;
    }

    pub fn begin_wait(&mut self, vx: u8) {
        self.wait_target = Some(vx);
    }

    /// Stop waiting, returning the register that was waiting for a key.
    pub fn end_wait(&mut self) -> Option<u8> {
        self.wait_target.take()
    }

    #[inline(always)]
    pub fn is_waiting(&self) -> bool {
        self.wait_target.is_some()
    }

    pub(crate) fn reset(&mut self) {
        self.state = 0;
        self.wait_target = None;
    }
}

#[cfg(feature = "serde")]
mod de {
    use std::fmt::Display;

    use num_traits::AsPrimitive;
    use serde::de::{Deserialize, Error, Expected, Unexpected, Visitor};

    use super::*;

    impl Expected for InvalidKeyCode {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            <Self as Display>::fmt(self, f)
        }
    }

    impl<'de> Deserialize<'de> for KeyCode {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            // YAML integer type
            deserializer.deserialize_i64(KeyCodeVisitor)
        }
    }

    struct KeyCodeVisitor;

    impl KeyCodeVisitor {
        #[inline]
        fn check_int<N, E>(val: N) -> Result<u8, E>
        where
            N: AsPrimitive<i64>,
            E: Error,
        {
            let n = val.as_();
            if n < 0 || n > u8::MAX as i64 {
                Err(E::invalid_value(Unexpected::Signed(n), &InvalidKeyCode(u8::MAX)))
            } else {
                Ok(n as u8)
            }
        }
    }

    impl<'de> Visitor<'de> for KeyCodeVisitor {
        type Value = KeyCode;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "an integer between 0 and 15")
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            let key_id = Self::check_int(v)?;
            KeyCode::try_from(key_id).map_err(|err| E::invalid_value(Unexpected::Signed(v), &err))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            let key_id = u8::try_from(v)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &InvalidKeyCode(u8::MAX)))?;
            KeyCode::try_from(key_id).map_err(|err| E::invalid_value(Unexpected::Unsigned(v), &err))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut keypad = Keypad::new();

        keypad.set(KeyCode::Key0, true);
        assert_eq!(keypad.state, 0b00000000_00000001);
        assert!(keypad.is_pressed(KeyCode::Key0));
        assert!(!keypad.is_pressed(KeyCode::Key1));
        assert!(!keypad.is_pressed(KeyCode::Key7));

        keypad.set(KeyCode::Key7, true);
        assert_eq!(keypad.state, 0b00000000_10000001);
        assert!(keypad.is_pressed(KeyCode::Key7));

        keypad.set(KeyCode::Key0, false);
        assert_eq!(keypad.state, 0b00000000_10000000);
        assert!(!keypad.is_pressed(KeyCode::Key0));

        keypad.set(KeyCode::KeyF, true);
        assert_eq!(keypad.state, 0b10000000_10000000);
        assert!(keypad.is_pressed(KeyCode::KeyF));
        assert_eq!(
            keypad.pressed().collect::<Vec<_>>(),
            vec![KeyCode::Key7, KeyCode::KeyF]
        );

        keypad.clear();
        assert!(!keypad.any_key());
    }

    #[test]
    fn test_keycode_conversion() {
        assert_eq!(KeyCode::try_from(0xA), Ok(KeyCode::KeyA));
        assert_eq!(KeyCode::try_from(15), Ok(KeyCode::KeyF));
        assert_eq!(KeyCode::try_from(16), Err(InvalidKeyCode(16)));
        assert_eq!(u8::from(KeyCode::Key9), 9);
        assert_eq!(KeyCode::KeyC.to_string(), "kc");
    }

    #[test]
    fn test_wait_target() {
        let mut keypad = Keypad::new();
        assert!(!keypad.is_waiting());

        keypad.begin_wait(3);
        assert!(keypad.is_waiting());
        assert_eq!(keypad.end_wait(), Some(3));
        assert_eq!(keypad.end_wait(), None);
    }
}
