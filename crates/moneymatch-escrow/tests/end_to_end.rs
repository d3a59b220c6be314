//! End-to-end scenarios across the ledger, access control and the engine.
//!
//! Each test drives a full match lifecycle through the public API the way a
//! host would: mint and approve on the token, then call the engine with the
//! token and role registry passed in. Escrow conservation is checked after
//! every scenario.

use moneymatch_escrow::{EscrowEngine, VoteOutcome};
use moneymatch_ledger::{Ledger, ModeratorCheck, Role, RoleRegistry, TokenLedger};
use moneymatch_types::*;

const STAKE: Amount = 1_000;
const STARTING_BALANCE: Amount = 10_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deployed token, roles and engine with two funded players.
struct Arena {
    engine: EscrowEngine,
    token: TokenLedger,
    roles: RoleRegistry,
    owner: AccountId,
    escrow: AccountId,
    player1: AccountId,
    player2: AccountId,
}

impl Arena {
    fn new() -> Self {
        init_tracing();
        let owner = AccountId::from_seed([10; 32]);
        let escrow = AccountId::from_seed([11; 32]);
        let player1 = AccountId::from_seed([12; 32]);
        let player2 = AccountId::from_seed([13; 32]);

        let mut token = TokenLedger::smashpros(owner);
        for player in [player1, player2] {
            token.mint(&owner, &player, STARTING_BALANCE).unwrap();
            token.approve(&player, &escrow, STARTING_BALANCE).unwrap();
        }
        Self {
            engine: EscrowEngine::new(EscrowConfig::new(escrow)).unwrap(),
            token,
            roles: RoleRegistry::new(owner).unwrap(),
            owner,
            escrow,
            player1,
            player2,
        }
    }

    fn start(&mut self, amount: Amount, max_matches: u32) -> Result<MatchId> {
        let (p1, p2) = (self.player1, self.player2);
        self.engine.start(&mut self.token, &p1, &p2, amount, max_matches)
    }

    fn accept(&mut self, id: &MatchId, amount: Amount) -> Result<()> {
        let p2 = self.player2;
        self.engine.accept(&mut self.token, &p2, id, amount)
    }

    fn started(&mut self, max_matches: u32) -> MatchId {
        let id = self.start(STAKE, max_matches).unwrap();
        self.accept(&id, STAKE).unwrap();
        id
    }

    fn vote(&mut self, voter: AccountId, id: &MatchId, claimed: AccountId) -> Result<VoteOutcome> {
        self.engine.agree(&mut self.token, &voter, id, &claimed)
    }

    /// Both players claim the round for themselves.
    fn disagree(&mut self, id: &MatchId) -> VoteOutcome {
        let (p1, p2) = (self.player1, self.player2);
        self.vote(p1, id, p1).unwrap();
        self.vote(p2, id, p2).unwrap()
    }

    fn both_agree(&mut self, id: &MatchId, winner: AccountId) -> VoteOutcome {
        let (p1, p2) = (self.player1, self.player2);
        self.vote(p1, id, winner).unwrap();
        self.vote(p2, id, winner).unwrap()
    }

    fn withdraw(&mut self, caller: AccountId, id: &MatchId) -> Result<()> {
        self.engine
            .emergency_withdraw(&mut self.token, &self.roles, &caller, id)
    }

    fn assert_conserved(&self) {
        self.engine.verify_escrow(&self.token).unwrap();
        assert_eq!(self.token.circulating(), self.token.total_supply());
    }
}

// =========================================================================
// Start
// =========================================================================

#[test]
fn start_opens_sent_match() {
    let mut arena = Arena::new();
    let id = arena.start(STAKE, 3).unwrap();

    let m = arena.engine.get_match(&id);
    assert_eq!(m.id, id);
    assert_eq!(m.initiator, arena.player1);
    assert_eq!(m.opponent, arena.player2);
    assert_eq!(m.amount, STAKE);
    assert_eq!(m.max_matches, 3);
    assert_eq!(m.state, MatchState::Sent);
    assert!(m.winner.is_null());
    assert!(m.initiator_agreement.is_null() && m.opponent_agreement.is_null());
    assert_eq!(arena.token.balance_of(&arena.player1), STARTING_BALANCE - STAKE);
    arena.assert_conserved();
}

#[test]
fn start_rejects_bad_parameters() {
    let mut arena = Arena::new();
    let (p1, p2) = (arena.player1, arena.player2);
    let (engine, token) = (&mut arena.engine, &mut arena.token);

    assert_eq!(
        engine.start(token, &p1, &AccountId::NULL, STAKE, 3),
        Err(MoneymatchError::NullOpponent)
    );
    assert_eq!(engine.start(token, &p1, &p1, STAKE, 3), Err(MoneymatchError::SelfMatch));
    assert_eq!(engine.start(token, &p1, &p2, 0, 3), Err(MoneymatchError::ZeroAmount));
    assert_eq!(
        engine.start(token, &p1, &p2, STAKE, 4),
        Err(MoneymatchError::EvenSeriesLength(4))
    );
    assert_eq!(
        engine.start(token, &p1, &p2, STAKE, 0),
        Err(MoneymatchError::EvenSeriesLength(0))
    );
    assert!(engine.events().is_empty());
}

#[test]
fn start_needs_balance_then_allowance() {
    let mut arena = Arena::new();
    let err = arena.start(STARTING_BALANCE + 1, 3).unwrap_err();
    assert!(matches!(err, MoneymatchError::InsufficientBalance { .. }));

    let (p1, escrow) = (arena.player1, arena.escrow);
    arena.token.approve(&p1, &escrow, STAKE - 1).unwrap();
    let err = arena.start(STAKE, 3).unwrap_err();
    assert_eq!(
        err,
        MoneymatchError::InsufficientAllowance {
            needed: STAKE,
            approved: STAKE - 1
        }
    );
    assert_eq!(arena.token.balance_of(&p1), STARTING_BALANCE);
    arena.assert_conserved();
}

// =========================================================================
// Accept / decline
// =========================================================================

#[test]
fn accept_failures_leave_match_sent() {
    let mut arena = Arena::new();
    let id = arena.start(STAKE, 3).unwrap();
    let p1 = arena.player1;

    assert_eq!(
        arena.engine.accept(&mut arena.token, &p1, &id, STAKE),
        Err(MoneymatchError::NotOpponent)
    );
    assert!(matches!(
        arena.accept(&id, STAKE * 2),
        Err(MoneymatchError::AmountMismatch { .. })
    ));
    assert_eq!(arena.accept(&MatchId::NIL, STAKE), Err(MoneymatchError::NullMatchId));

    let p2 = arena.player2;
    let escrow = arena.escrow;
    arena.token.approve(&p2, &escrow, 0).unwrap();
    assert!(matches!(
        arena.accept(&id, STAKE),
        Err(MoneymatchError::InsufficientAllowance { .. })
    ));

    assert_eq!(arena.engine.get_match(&id).state, MatchState::Sent);
    assert_eq!(arena.token.balance_of(&escrow), STAKE);
    arena.assert_conserved();
}

#[test]
fn accept_indexes_opponent() {
    let mut arena = Arena::new();
    assert!(arena.engine.matches_for(&arena.player2).is_empty());
    let id = arena.started(3);

    let for_p2 = arena.engine.matches_for(&arena.player2);
    assert_eq!(for_p2.len(), 1);
    assert_eq!(for_p2[0].id, id);
    assert_eq!(for_p2[0].state, MatchState::Started);
    assert_eq!(arena.token.balance_of(&arena.escrow), 2 * STAKE);
    arena.assert_conserved();
}

#[test]
fn decline_returns_initiator_stake() {
    let mut arena = Arena::new();
    let id = arena.start(STAKE, 3).unwrap();
    let p2 = arena.player2;
    arena.engine.decline(&mut arena.token, &p2, &id).unwrap();

    assert_eq!(arena.token.balance_of(&arena.player1), STARTING_BALANCE);
    assert_eq!(arena.engine.get_match(&id), Match::default());
    assert!(arena.engine.matches_for(&arena.player1).is_empty());
    assert_eq!(
        arena.engine.decline(&mut arena.token, &p2, &id),
        Err(MoneymatchError::MatchNotFound(id))
    );
    arena.assert_conserved();
}

// =========================================================================
// Queries
// =========================================================================

#[test]
fn matches_for_caller_in_insertion_order() {
    let mut arena = Arena::new();
    let first = arena.start(100, 1).unwrap();
    let second = arena.start(200, 3).unwrap();
    let third = arena.start(300, 5).unwrap();
    let p2 = arena.player2;
    arena.engine.decline(&mut arena.token, &p2, &second).unwrap();

    let ids: Vec<_> = arena
        .engine
        .matches_for(&arena.player1)
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![first, third]);
    assert!(arena.engine.matches_for(&arena.owner).is_empty());
    arena.assert_conserved();
}

#[test]
fn unknown_match_reads_as_zero_record() {
    let arena = Arena::new();
    let m = arena.engine.get_match(&MatchId::from_bytes([42; 16]));
    assert_eq!(m, Match::default());
    assert_eq!(m.state, MatchState::Sent);
    assert_eq!(m.amount, 0);
}

// =========================================================================
// Agreement
// =========================================================================

#[test]
fn best_of_three_pays_winner_the_pot() {
    let mut arena = Arena::new();
    let p1 = arena.player1;
    let id = arena.started(3);

    assert_eq!(
        arena.both_agree(&id, p1),
        VoteOutcome::RoundWon { winner: p1, score: 1 }
    );
    let m = arena.engine.get_match(&id);
    assert_eq!(m.initiator_score, 1);
    assert_eq!(m.state, MatchState::Started);

    assert_eq!(
        arena.both_agree(&id, p1),
        VoteOutcome::SeriesWon { winner: p1, score: 2 }
    );
    assert_eq!(arena.token.balance_of(&p1), STARTING_BALANCE + STAKE);
    assert_eq!(arena.token.balance_of(&arena.player2), STARTING_BALANCE - STAKE);
    assert_eq!(arena.token.balance_of(&arena.escrow), 0);
    assert!(!arena.engine.entry(&id).is_active());
    arena.assert_conserved();
}

#[test]
fn split_rounds_go_the_distance() {
    let mut arena = Arena::new();
    let (p1, p2) = (arena.player1, arena.player2);
    let id = arena.started(5);

    arena.both_agree(&id, p2);
    arena.both_agree(&id, p1);
    arena.both_agree(&id, p2);
    arena.both_agree(&id, p1);
    let m = arena.engine.get_match(&id);
    assert_eq!((m.initiator_score, m.opponent_score), (2, 2));

    assert_eq!(
        arena.both_agree(&id, p2),
        VoteOutcome::SeriesWon { winner: p2, score: 3 }
    );
    assert_eq!(arena.token.balance_of(&p2), STARTING_BALANCE + STAKE);
    arena.assert_conserved();
}

#[test]
fn voter_may_change_claim_before_counterpart_votes() {
    let mut arena = Arena::new();
    let (p1, p2) = (arena.player1, arena.player2);
    let id = arena.started(3);

    arena.vote(p1, &id, p1).unwrap();
    assert_eq!(arena.vote(p1, &id, p2).unwrap(), VoteOutcome::Recorded);
    assert_eq!(arena.engine.get_match(&id).initiator_agreement, p2);

    assert_eq!(
        arena.vote(p2, &id, p2).unwrap(),
        VoteOutcome::RoundWon { winner: p2, score: 1 }
    );
}

#[test]
fn agreement_resets_attempts() {
    let mut arena = Arena::new();
    let p1 = arena.player1;
    let id = arena.started(3);

    arena.disagree(&id);
    arena.disagree(&id);
    assert_eq!(arena.engine.get_match(&id).attempts, 2);

    arena.both_agree(&id, p1);
    let m = arena.engine.get_match(&id);
    assert_eq!(m.attempts, 0);
    assert!(!m.frozen);
    assert_eq!(m.state, MatchState::Started);
}

#[test]
fn claimed_winner_must_be_a_participant() {
    let mut arena = Arena::new();
    let (p1, owner) = (arena.player1, arena.owner);
    let id = arena.started(3);

    assert_eq!(
        arena.vote(p1, &id, owner),
        Err(MoneymatchError::InvalidClaimedWinner(owner))
    );
    assert_eq!(
        arena.vote(owner, &id, p1),
        Err(MoneymatchError::NotParticipant(owner))
    );
    assert_eq!(arena.engine.get_match(&id).state, MatchState::Started);
}

// =========================================================================
// Freeze and emergency withdrawal
// =========================================================================

#[test]
fn three_disagreements_then_moderator_unwinds() {
    let mut arena = Arena::new();
    let owner = arena.owner;
    let id = arena.started(3);

    assert_eq!(arena.disagree(&id), VoteOutcome::Disagreed { attempts: 1 });
    assert_eq!(arena.disagree(&id), VoteOutcome::Disagreed { attempts: 2 });
    assert_eq!(arena.disagree(&id), VoteOutcome::Frozen { attempts: 3 });
    let m = arena.engine.get_match(&id);
    assert_eq!((m.state, m.attempts, m.frozen), (MatchState::Frozen, 3, true));
    arena.assert_conserved();

    arena.withdraw(owner, &id).unwrap();
    assert_eq!(arena.token.balance_of(&arena.player1), STARTING_BALANCE);
    assert_eq!(arena.token.balance_of(&arena.player2), STARTING_BALANCE);
    assert_eq!(arena.engine.entry(&id), MatchEntry::Absent);
    assert!(arena.engine.matches_for(&arena.player1).is_empty());
    assert!(arena.engine.matches_for(&arena.player2).is_empty());
    arena.assert_conserved();
}

#[test]
fn only_moderators_may_unwind() {
    let mut arena = Arena::new();
    let (p1, owner) = (arena.player1, arena.owner);
    let referee = AccountId::from_seed([14; 32]);
    let id = arena.started(3);
    for _ in 0..3 {
        arena.disagree(&id);
    }

    assert_eq!(arena.withdraw(p1, &id), Err(MoneymatchError::NotModerator(p1)));
    assert_eq!(
        arena.withdraw(referee, &id),
        Err(MoneymatchError::NotModerator(referee))
    );

    arena
        .roles
        .grant_role(&owner, Role::MatchModerator, referee)
        .unwrap();
    assert!(arena.roles.is_moderator(&referee));
    arena.withdraw(referee, &id).unwrap();
    arena.assert_conserved();
}

#[test]
fn unwind_refused_while_consensus_possible() {
    let mut arena = Arena::new();
    let owner = arena.owner;
    let id = arena.started(3);

    assert_eq!(
        arena.withdraw(owner, &id),
        Err(MoneymatchError::ConsensusStillPossible { attempts: 0, max: 3 })
    );
    arena.disagree(&id);
    arena.disagree(&id);
    assert_eq!(
        arena.withdraw(owner, &id),
        Err(MoneymatchError::ConsensusStillPossible { attempts: 2, max: 3 })
    );
    assert_eq!(arena.withdraw(owner, &MatchId::NIL), Err(MoneymatchError::NullMatchId));
    assert_eq!(arena.token.balance_of(&arena.escrow), 2 * STAKE);
}

// =========================================================================
// Events and conservation
// =========================================================================

#[test]
fn event_trail_for_frozen_and_disputed_match() {
    let mut arena = Arena::new();
    let owner = arena.owner;
    let id = arena.started(3);
    for _ in 0..3 {
        arena.disagree(&id);
    }
    arena.withdraw(owner, &id).unwrap();

    let kinds: Vec<_> = arena.engine.events().iter().map(|r| r.event.kind()).collect();
    assert_eq!(kinds.first(), Some(&"MATCH_SENT"));
    assert_eq!(kinds.iter().filter(|k| **k == "ROUND_AGREE").count(), 6);
    assert_eq!(
        &kinds[kinds.len() - 2..],
        &["MATCH_FREEZE", "MATCH_DISPUTED"]
    );

    let sequences: Vec<_> = arena.engine.events().iter().map(|r| r.sequence).collect();
    assert!(sequences.windows(2).all(|w| w[1] == w[0] + 1));
    assert!(arena.engine.events().iter().all(|r| r.event.match_id() == id));

    let json = serde_json::to_string(arena.engine.events()).unwrap();
    let back: Vec<EventRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, arena.engine.drain_events());
}

#[test]
fn escrow_conserved_across_interleaved_matches() {
    let mut arena = Arena::new();
    let (p1, p2, owner) = (arena.player1, arena.player2, arena.owner);

    let won = arena.started(1);
    let declined = arena.start(250, 3).unwrap();
    let frozen = arena.started(3);
    let pending = arena.start(400, 5).unwrap();
    arena.assert_conserved();

    arena.both_agree(&won, p2);
    arena.assert_conserved();

    arena.engine.decline(&mut arena.token, &p2, &declined).unwrap();
    arena.assert_conserved();

    for _ in 0..3 {
        arena.disagree(&frozen);
    }
    arena.withdraw(owner, &frozen).unwrap();
    arena.assert_conserved();

    assert_eq!(arena.token.balance_of(&arena.escrow), 400);
    assert_eq!(arena.engine.committed().unwrap(), 400);
    let left: Vec<_> = arena.engine.matches_for(&p1).into_iter().map(|m| m.id).collect();
    assert_eq!(left, vec![pending]);
    assert_eq!(arena.token.balance_of(&p2), STARTING_BALANCE + STAKE);
    assert_eq!(arena.token.balance_of(&p1), STARTING_BALANCE - STAKE - 400);
}
