//! Which side of the match an account sits on.

use moneymatch_types::{AccountId, Match};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    Initiator,
    Opponent,
}

impl Seat {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Initiator => Self::Opponent,
            Self::Opponent => Self::Initiator,
        }
    }
}

/// Resolve `account` to its seat in `record`. The null account has no seat.
#[must_use]
pub fn seat_of(record: &Match, account: &AccountId) -> Option<Seat> {
    if account.is_null() {
        None
    } else if *account == record.initiator {
        Some(Seat::Initiator)
    } else if *account == record.opponent {
        Some(Seat::Opponent)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use moneymatch_types::MatchId;

    use super::*;

    #[test]
    fn seats_resolve() {
        let a = AccountId::from_seed([1; 32]);
        let b = AccountId::from_seed([2; 32]);
        let m = Match::open(MatchId::from_bytes([1; 16]), a, b, 10, 3);
        assert_eq!(seat_of(&m, &a), Some(Seat::Initiator));
        assert_eq!(seat_of(&m, &b), Some(Seat::Opponent));
        assert_eq!(seat_of(&m, &AccountId::from_seed([3; 32])), None);
        assert_eq!(seat_of(&Match::default(), &AccountId::NULL), None);
        assert_eq!(Seat::Initiator.other(), Seat::Opponent);
    }
}
