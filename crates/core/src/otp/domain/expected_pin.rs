use std::fmt;

use crate::shared::error::VerificationError;

/// The PIN the user was asked to sign in the video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpectedPin {
    digits: Vec<u8>,
}

impl ExpectedPin {
    /// Accepts exactly `length` ASCII digits, surrounding whitespace ignored.
    ///
    /// PINs are issued without adjacent repeats. One that has them is still
    /// accepted, but it cannot validate under last-occurrence reduction.
    pub fn parse(text: &str, length: usize) -> Result<Self, VerificationError> {
        let text = text.trim();
        if text.len() != length {
            return Err(VerificationError::InvalidPin(format!(
                "expected {length} digits, got {:?}",
                text
            )));
        }
        let digits = text
            .chars()
            .map(|c| {
                c.to_digit(10)
                    .map(|d| d as u8)
                    .ok_or_else(|| VerificationError::InvalidPin(format!("{c:?} is not a digit")))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        if digits.windows(2).any(|w| w[0] == w[1]) {
            log::warn!("PIN {text} repeats a digit in adjacent positions");
        }
        Ok(Self { digits })
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn contains(&self, digit: u8) -> bool {
        self.digits.contains(&digit)
    }
}

impl fmt::Display for ExpectedPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.digits {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_valid_pin() {
        let pin = ExpectedPin::parse(" 4821\n", 4).unwrap();
        assert_eq!(pin.digits(), &[4, 8, 2, 1]);
        assert_eq!(pin.to_string(), "4821");
        assert!(pin.contains(8));
        assert!(!pin.contains(5));
    }

    #[rstest]
    #[case::too_short("123")]
    #[case::too_long("12345")]
    #[case::letter("12a4")]
    #[case::empty("")]
    #[case::unicode_digit("12٣4")]
    fn test_parse_rejects(#[case] text: &str) {
        let err = ExpectedPin::parse(text, 4).unwrap_err();
        assert_eq!(err.kind(), "invalid_pin");
    }

    #[test]
    fn test_adjacent_repeat_accepted() {
        let pin = ExpectedPin::parse("1123", 4).unwrap();
        assert_eq!(pin.digits(), &[1, 1, 2, 3]);
    }

    #[test]
    fn test_custom_length() {
        assert_eq!(ExpectedPin::parse("907153", 6).unwrap().digits().len(), 6);
    }
}
