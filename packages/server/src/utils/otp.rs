use rand::Rng;

/// Generate a 6-digit login OTP.
pub fn generate() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_shape() {
        for _ in 0..100 {
            let otp = generate();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            // No leading zero by construction, so the code survives being
            // parsed as a number by sloppy clients.
            assert_ne!(otp.as_bytes()[0], b'0');
        }
    }
}
