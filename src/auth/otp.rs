use rand::Rng;
use time::{Duration, OffsetDateTime};

/// Verification codes are valid for ten minutes.
pub const OTP_TTL: Duration = Duration::minutes(10);

/// Six decimal digits, never with a leading zero.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

pub fn expiry_from(now: OffsetDateTime) -> OffsetDateTime {
    now + OTP_TTL
}

/// True when a code is on file, has not expired and matches the candidate.
pub fn otp_matches(
    stored: Option<&str>,
    expires_at: Option<OffsetDateTime>,
    candidate: &str,
    now: OffsetDateTime,
) -> bool {
    match (stored, expires_at) {
        (Some(code), Some(expires)) => now <= expires && code == candidate,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-08-05 12:00 UTC);

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn matching_code_within_ttl_is_accepted() {
        let expires = expiry_from(NOW);
        assert!(otp_matches(Some("123456"), Some(expires), "123456", NOW));
        assert!(otp_matches(
            Some("123456"),
            Some(expires),
            "123456",
            expires
        ));
    }

    #[test]
    fn expired_code_is_rejected() {
        let expires = expiry_from(NOW);
        assert!(!otp_matches(
            Some("123456"),
            Some(expires),
            "123456",
            expires + Duration::seconds(1)
        ));
    }

    #[test]
    fn wrong_or_missing_code_is_rejected() {
        let expires = expiry_from(NOW);
        assert!(!otp_matches(Some("123456"), Some(expires), "654321", NOW));
        assert!(!otp_matches(None, Some(expires), "123456", NOW));
        assert!(!otp_matches(Some("123456"), None, "123456", NOW));
    }
}
