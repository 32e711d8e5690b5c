//! Typed numeric override buffer shared by the drafting tools.

use crate::input::Key;

/// Digits and at most one decimal point, typed while a gesture is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericInput {
    buffer: String,
}

impl NumericInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a key. Returns true if the buffer changed.
    pub fn handle_key(&mut self, key: &Key) -> bool {
        match key {
            Key::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(*c);
                true
            }
            Key::Char('.') if !self.buffer.contains('.') => {
                self.buffer.push('.');
                true
            }
            Key::Backspace => self.buffer.pop().is_some(),
            _ => false,
        }
    }

    /// Parsed value, or `None` when the buffer is empty, not a number, or
    /// too long to be finite.
    pub fn value(&self) -> Option<f64> {
        self.buffer.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(keys: &str) -> NumericInput {
        let mut n = NumericInput::new();
        for c in keys.chars() {
            n.handle_key(&Key::Char(c));
        }
        n
    }

    #[test]
    fn test_digits_and_point() {
        assert_eq!(typed("12.5").value(), Some(12.5));
        assert_eq!(typed(".5").value(), Some(0.5));
        assert_eq!(typed("5.").value(), Some(5.0));
    }

    #[test]
    fn test_empty_and_lone_point() {
        assert_eq!(NumericInput::new().value(), None);
        assert_eq!(typed(".").value(), None);
    }

    #[test]
    fn test_overflowing_digits_give_no_value() {
        assert_eq!(typed(&"9".repeat(20)).value(), Some(1e20));
        assert_eq!(typed(&"9".repeat(400)).value(), None);
    }

    #[test]
    fn test_second_point_ignored() {
        let n = typed("1.2.3");
        assert_eq!(n.buffer(), "1.23");
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut n = typed("4h-x");
        assert_eq!(n.buffer(), "4");
        assert!(!n.handle_key(&Key::Enter));
        assert!(!n.handle_key(&Key::Escape));
    }

    #[test]
    fn test_backspace() {
        let mut n = typed("42");
        assert!(n.handle_key(&Key::Backspace));
        assert_eq!(n.value(), Some(4.0));
        n.handle_key(&Key::Backspace);
        assert!(!n.handle_key(&Key::Backspace));
        assert!(n.is_empty());
    }
}
