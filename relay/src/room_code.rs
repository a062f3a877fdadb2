use std::fmt;

use rand::Rng;

const CODE_LEN: usize = 4;

/// Four uppercase letters identifying a room, e.g. `QXRT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode([u8; CODE_LEN]);

impl RoomCode {
    /// A uniformly random code.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut code = [0; CODE_LEN];
        for c in code.iter_mut() {
            *c = rng.gen_range(b'A'..=b'Z');
        }
        Self(code)
    }

    /// Accepts four ASCII letters in any case, surrounded by optional whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != CODE_LEN || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return None;
        }
        let mut code = [0; CODE_LEN];
        for (c, b) in code.iter_mut().zip(bytes) {
            *c = b.to_ascii_uppercase();
        }
        Some(Self(code))
    }

    pub fn as_str(&self) -> &str {
        // Only ever holds ASCII uppercase letters.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    quickcheck! {
        fn random_codes_are_four_uppercase_letters(seed: u64) -> bool {
            let mut rng = StdRng::seed_from_u64(seed);
            let code = RoomCode::random(&mut rng);
            code.as_str().len() == 4
                && code.as_str().bytes().all(|b| b.is_ascii_uppercase())
                && RoomCode::parse(code.as_str()) == Some(code)
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(RoomCode::parse(" abCd "), RoomCode::parse("ABCD"));
        assert_eq!(RoomCode::parse("abcd").unwrap().to_string(), "ABCD");
        assert_eq!(RoomCode::parse("ABC"), None);
        assert_eq!(RoomCode::parse("ABCDE"), None);
        assert_eq!(RoomCode::parse("AB1D"), None);
        assert_eq!(RoomCode::parse("ÄBCD"), None);
    }
}
