//! Order-number validation.
//!
//! Order numbers are decimal strings carrying a Luhn (mod-10) checksum.
//! The check streams over the digit bytes right-to-left so numbers of any
//! length are accepted without ever converting to a machine integer.

/// Returns `true` iff `s` is a non-empty ASCII-digit string whose Luhn
/// checksum is a multiple of 10. Leading zeros are permitted.
pub fn is_valid(s: &str) -> bool {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let mut sum = 0u32;
    for (i, b) in s.bytes().rev().enumerate() {
        let mut digit = u32::from(b - b'0');
        if i % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }

    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::is_valid;
    use rand::distributions::Alphanumeric;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    /// Independent oracle: digit-sum via per-character table lookup.
    fn oracle(s: &str) -> bool {
        if s.is_empty() {
            return false;
        }
        let mut digits = Vec::with_capacity(s.len());
        for c in s.chars() {
            match c.to_digit(10) {
                Some(d) if c.is_ascii() => digits.push(d),
                _ => return false,
            }
        }
        // Doubled-digit sums, indexed by the original digit.
        const DOUBLED: [u32; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];
        let sum: u32 = digits
            .iter()
            .rev()
            .enumerate()
            .map(|(i, &d)| if i % 2 == 1 { DOUBLED[d as usize] } else { d })
            .sum();
        sum % 10 == 0
    }

    #[test]
    fn boundary_set() {
        assert!(!is_valid(""));
        assert!(is_valid("0"));
        assert!(is_valid("00"));
        assert!(is_valid("18"));
        assert!(is_valid("79927398713"));
    }

    #[test]
    fn rejects_non_digit_input() {
        assert!(!is_valid("7992-7398-713"));
        assert!(!is_valid("79927398713 "));
        assert!(!is_valid("-79927398713"));
        assert!(!is_valid("abc"));
        assert!(!is_valid("７９"));
    }

    #[test]
    fn rejects_near_misses() {
        assert!(!is_valid("12345"));
        assert!(!is_valid("79927398710"));
        assert!(!is_valid("79927398714"));
    }

    #[test]
    fn matches_oracle_on_random_digit_strings() {
        let mut rng = StdRng::seed_from_u64(0x1dea);
        for _ in 0..10_000 {
            let len = rng.gen_range(1..=40);
            let s: String = (0..len)
                .map(|_| char::from(b'0' + rng.gen_range(0..10)))
                .collect();
            assert_eq!(is_valid(&s), oracle(&s), "disagreement on {s:?}");
        }
    }

    #[test]
    fn matches_oracle_on_random_ascii_strings() {
        let mut rng = StdRng::seed_from_u64(0xca5e);
        for _ in 0..10_000 {
            let len = rng.gen_range(0..=24);
            let s: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            assert_eq!(is_valid(&s), oracle(&s), "disagreement on {s:?}");
        }
    }

    #[test]
    fn accepts_numbers_longer_than_u64() {
        // 30 digits; appending the correct check digit must validate.
        let base = "123456789012345678901234567890";
        let valid = (0..10)
            .map(|d| format!("{base}{d}"))
            .find(|candidate| oracle(candidate))
            .unwrap();
        assert!(is_valid(&valid));
    }
}
