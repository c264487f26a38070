use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A player's finishing rank in a single game, 1 (best) through 4 (worst).
///
/// Earlier data sometimes called this field "score" or "points" with loose
/// range rules; the tracker only ever deals in the four ranks, so the type
/// enumerates them outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FinishingPosition {
    First,
    Second,
    Third,
    Fourth,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid finishing position {0}, expected 1-4")]
pub struct InvalidPositionValue(pub u8);

impl FinishingPosition {
    pub const ALL: [FinishingPosition; 4] = [
        FinishingPosition::First,
        FinishingPosition::Second,
        FinishingPosition::Third,
        FinishingPosition::Fourth,
    ];

    /// The numeric rank, 1 through 4.
    pub fn rank(self) -> u8 {
        match self {
            FinishingPosition::First => 1,
            FinishingPosition::Second => 2,
            FinishingPosition::Third => 3,
            FinishingPosition::Fourth => 4,
        }
    }

    pub fn is_win(self) -> bool {
        self == FinishingPosition::First
    }
}

impl TryFrom<u8> for FinishingPosition {
    type Error = InvalidPositionValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FinishingPosition::First),
            2 => Ok(FinishingPosition::Second),
            3 => Ok(FinishingPosition::Third),
            4 => Ok(FinishingPosition::Fourth),
            other => Err(InvalidPositionValue(other)),
        }
    }
}

impl From<FinishingPosition> for u8 {
    fn from(position: FinishingPosition) -> u8 {
        position.rank()
    }
}

impl std::fmt::Display for FinishingPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, FinishingPosition::First)]
    #[case(2, FinishingPosition::Second)]
    #[case(3, FinishingPosition::Third)]
    #[case(4, FinishingPosition::Fourth)]
    fn converts_valid_ranks(#[case] value: u8, #[case] expected: FinishingPosition) {
        assert_eq!(FinishingPosition::try_from(value).unwrap(), expected);
        assert_eq!(expected.rank(), value);
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(255)]
    fn rejects_out_of_range_ranks(#[case] value: u8) {
        assert_eq!(
            FinishingPosition::try_from(value),
            Err(InvalidPositionValue(value))
        );
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&FinishingPosition::Third).unwrap();
        assert_eq!(json, "3");

        let parsed: FinishingPosition = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, FinishingPosition::First);

        assert!(serde_json::from_str::<FinishingPosition>("7").is_err());
    }

    #[test]
    fn only_first_place_is_a_win() {
        assert!(FinishingPosition::First.is_win());
        assert!(!FinishingPosition::Second.is_win());
        assert!(!FinishingPosition::Fourth.is_win());
    }
}
