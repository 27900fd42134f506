//! Command translation for the LED controller
//!
//! This module handles:
//! - Normalizing the untrusted request integer to an LED state
//! - Formatting the state into the wire line the firmware reads
//! - Delegating the write to the serial channel and acknowledging it

mod gateway;

pub use gateway::{Acknowledgement, CommandGateway, DeviceCommand};

/// Normalized LED state; the wire protocol only ever carries these two values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    Off,
    On,
}

impl LedState {
    /// Truthiness rule: zero is off, any nonzero value (including
    /// negatives) is on. Total over all integers.
    pub fn from_raw(state: i64) -> Self {
        if state == 0 {
            LedState::Off
        } else {
            LedState::On
        }
    }

    /// Format the line sent to the device. The firmware reads until the
    /// trailing newline, so it is part of the protocol.
    pub fn wire_line(self) -> String {
        let digit = match self {
            LedState::Off => 0,
            LedState::On => 1,
        };
        format!("LED {digit}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_off_everything_else_is_on() {
        assert_eq!(LedState::from_raw(0), LedState::Off);
        for n in [1, 7, -3, i64::MAX, i64::MIN, 255, -1] {
            assert_eq!(LedState::from_raw(n), LedState::On, "state {n}");
        }
    }

    #[test]
    fn wire_lines_are_fixed() {
        assert_eq!(LedState::Off.wire_line(), "LED 0\n");
        assert_eq!(LedState::On.wire_line(), "LED 1\n");
    }
}
