//! One-time code generation and parsing.

use rand::Rng;

/// Smallest code ever issued.
pub const OTP_MIN: u32 = 100_000;

/// Largest code ever issued.
pub const OTP_MAX: u32 = 999_999;

/// Source of verification codes.
pub trait OtpGenerator: Send + Sync {
    /// Produce a code in `OTP_MIN..=OTP_MAX`.
    fn generate(&self) -> u32;
}

/// Uniformly random 6-digit codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOtp;

impl OtpGenerator for RandomOtp {
    fn generate(&self) -> u32 {
        rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX)
    }
}

/// Always issues the same code.
#[derive(Debug, Clone, Copy)]
pub struct FixedOtp(pub u32);

impl OtpGenerator for FixedOtp {
    fn generate(&self) -> u32 {
        self.0
    }
}

/// Parse a submitted code from its leading digits.
///
/// Leading whitespace and a `+` sign are skipped and anything after the
/// first non-digit is ignored, so `"123456abc"` reads as `123456`.
pub fn parse_otp(input: &str) -> Option<u32> {
    let input = input.trim_start();
    let input = input.strip_prefix('+').unwrap_or(input);
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());

    input[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_otp_range() {
        let generator = RandomOtp;
        for _ in 0..10_000 {
            let otp = generator.generate();
            assert!((OTP_MIN..=OTP_MAX).contains(&otp), "out of range: {}", otp);
            assert_eq!(otp.to_string().len(), 6);
        }
    }

    #[test]
    fn test_fixed_otp() {
        assert_eq!(FixedOtp(123456).generate(), 123456);
    }

    #[test]
    fn test_parse_otp() {
        assert_eq!(parse_otp("123456"), Some(123456));
        assert_eq!(parse_otp(" 123456\n"), Some(123456));
        assert_eq!(parse_otp("+123456"), Some(123456));
        assert_eq!(parse_otp("123456abc"), Some(123456));
        assert_eq!(parse_otp("123456.0"), Some(123456));
        assert_eq!(parse_otp("123456 789"), Some(123456));
        assert_eq!(parse_otp("0123456"), Some(123456));
        assert_eq!(parse_otp("12a456"), Some(12));
        assert_eq!(parse_otp(""), None);
        assert_eq!(parse_otp("abc123456"), None);
        assert_eq!(parse_otp("-123456"), None);
        assert_eq!(parse_otp("99999999999"), None);
    }
}
