use rand::{rngs::OsRng, Rng};

pub const CODE_MIN: i32 = 100_000;
pub const CODE_MAX: i32 = 999_999;

/// Six-digit one-time code for email confirmation and password reset,
/// drawn uniformly from the OS CSPRNG.
pub fn generate_code() -> i32 {
    OsRng.gen_range(CODE_MIN..=CODE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_always_six_digits() {
        for _ in 0..1_000 {
            let code = generate_code();
            assert!((CODE_MIN..=CODE_MAX).contains(&code));
            assert_eq!(code.to_string().len(), 6);
        }
    }

    #[test]
    fn codes_are_not_constant() {
        let first = generate_code();
        // 1 in ~900k per draw; 20 identical draws means a broken generator.
        assert!((0..20).map(|_| generate_code()).any(|c| c != first));
    }
}
