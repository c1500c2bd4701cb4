//! Randomized digit permutations for the grid axes.

use serde::{Deserialize, Deserializer, Serialize};

use super::EngineError;

/// A permutation of the digits 0-9.
///
/// One of these is assigned to each axis of a numbered pool. The type can
/// only be built through [`Digits::random`] or the validating `TryFrom`,
/// so a value in hand is always a real permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Digits([u8; 10]);

impl Digits {
    /// Draw a fresh permutation with a Fisher-Yates shuffle over the
    /// supplied random source.
    pub fn random(rng: &dyn ring::rand::SecureRandom) -> Result<Digits, EngineError> {
        let mut digits: [u8; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        for i in (1..digits.len()).rev() {
            let mut buf = [0u8; 4];
            rng.fill(&mut buf)?;
            let j = (u32::from_be_bytes(buf) as usize) % (i + 1);
            digits.swap(i, j);
        }
        Ok(Digits(digits))
    }

    /// The position a digit occupies, as an axis index 0-9.
    pub fn position_of(&self, digit: u8) -> Result<u8, EngineError> {
        self.0
            .iter()
            .position(|&d| d == digit)
            .map(|idx| idx as u8)
            .ok_or(EngineError::DigitMissing(digit))
    }

    pub fn as_array(&self) -> &[u8; 10] {
        &self.0
    }

    pub fn into_array(self) -> [u8; 10] {
        self.0
    }
}

impl TryFrom<[u8; 10]> for Digits {
    type Error = EngineError;

    fn try_from(raw: [u8; 10]) -> Result<Self, Self::Error> {
        let mut seen = [false; 10];
        for &digit in &raw {
            if digit > 9 || seen[digit as usize] {
                return Err(EngineError::NotAPermutation);
            }
            seen[digit as usize] = true;
        }
        Ok(Digits(raw))
    }
}

impl<'de> Deserialize<'de> for Digits {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = <[u8; 10]>::deserialize(deserializer)?;
        Digits::try_from(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ring::rand::SystemRandom;

    #[test]
    fn random_draw_is_a_permutation() {
        let rng = SystemRandom::new();
        let digits = Digits::random(&rng).unwrap();
        let mut sorted = digits.into_array();
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn repeated_draws_differ() {
        let rng = SystemRandom::new();
        let first = Digits::random(&rng).unwrap();
        let all_same = (0..4).all(|_| {
            Digits::random(&rng)
                .map(|d| d == first)
                .unwrap_or(false)
        });
        assert!(!all_same, "five identical shuffles in a row");
    }

    #[test]
    fn position_of_locates_every_digit() {
        let digits = Digits::try_from([3, 0, 7, 4, 1, 8, 5, 2, 9, 6]).unwrap();
        for digit in 0..10u8 {
            let pos = digits.position_of(digit).unwrap();
            assert_eq!(digits.as_array()[pos as usize], digit);
        }
        assert_eq!(digits.position_of(7).unwrap(), 2);
    }

    #[test]
    fn rejects_duplicate_digits() {
        let result = Digits::try_from([0, 0, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(matches!(result, Err(EngineError::NotAPermutation)));
    }

    #[test]
    fn rejects_out_of_range_digits() {
        let result = Digits::try_from([0, 1, 2, 3, 4, 5, 6, 7, 8, 10]);
        assert!(matches!(result, Err(EngineError::NotAPermutation)));
    }

    #[test]
    fn serde_round_trips_and_validates() {
        let digits = Digits::try_from([9, 8, 7, 6, 5, 4, 3, 2, 1, 0]).unwrap();
        let json = serde_json::to_string(&digits).unwrap();
        assert_eq!(json, "[9,8,7,6,5,4,3,2,1,0]");
        let back: Digits = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digits);

        let bad: Result<Digits, _> = serde_json::from_str("[1,1,2,3,4,5,6,7,8,9]");
        assert!(bad.is_err());
    }
}
