//! The escrow engine: every lifecycle operation on a match.
//!
//! ```text
//!   start ──► SENT ──accept──► STARTED ◄──────────── round agreed ───┐
//!              │                 │ first vote                        │
//!           decline              ▼                                   │
//!              │              VOTING ── second vote ──┬── agreed ─────┤
//!              ▼                 ▲                     │              └─ majority ─► FINISHED
//!        stake refunded,         └──── disagreed ──────┤                  pot paid, deleted
//!           deleted                                    └── third disagreement ─► FROZEN
//!                                                                                 │ emergency_withdraw
//!                                                                                 ▼
//!                                                           stakes refunded, deleted ◄─ DISPUTED
//! ```
//!
//! The engine never holds a ledger or an access-control registry; both are
//! passed into the operation that needs them. Each operation validates
//! everything, then moves funds, then writes the registry, then emits. An
//! error at any step returns before the next one starts.

use chrono::Utc;
use moneymatch_consensus::{VoteOutcome, cast_vote, is_valid_series_length};
use moneymatch_ledger::{Ledger, ModeratorCheck};
use moneymatch_types::{
    constants, AccountId, Amount, EscrowConfig, EventRecord, Match, MatchEntry, MatchEvent, MatchId,
    MatchState, MoneymatchError, Result,
};

use crate::conservation::EscrowConservation;
use crate::events::EventLog;
use crate::registry::MatchRegistry;
use crate::settlement::{self, PayoutLeg};

/// Custodian of every live wager.
#[derive(Debug)]
pub struct EscrowEngine {
    config: EscrowConfig,
    registry: MatchRegistry,
    conservation: EscrowConservation,
    events: EventLog,
    /// Mixed into id derivation; bumped on every successful `start`.
    next_sequence: u64,
}

impl EscrowEngine {
    /// Create an engine with an empty registry.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` does not validate.
    pub fn new(config: EscrowConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            escrow = %config.escrow_account,
            max_attempts = config.max_agreement_attempts,
            max_series = config.max_series_length,
            "escrow engine ready"
        );
        Ok(Self {
            config,
            registry: MatchRegistry::new(),
            conservation: EscrowConservation::new(),
            events: EventLog::new(),
            next_sequence: 0,
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open a best-of-`max_matches` wager against `opponent` and escrow the
    /// initiator's stake.
    ///
    /// Checks, in order: null opponent, self match, zero amount, even series,
    /// series bound, pot overflow, balance, allowance.
    pub fn start<L: Ledger + ?Sized>(
        &mut self,
        ledger: &mut L,
        initiator: &AccountId,
        opponent: &AccountId,
        amount: Amount,
        max_matches: u32,
    ) -> Result<MatchId> {
        if opponent.is_null() {
            return Err(MoneymatchError::NullOpponent);
        }
        if opponent == initiator {
            return Err(MoneymatchError::SelfMatch);
        }
        if amount == 0 {
            return Err(MoneymatchError::ZeroAmount);
        }
        if !is_valid_series_length(max_matches) {
            return Err(MoneymatchError::EvenSeriesLength(max_matches));
        }
        if max_matches > self.config.max_series_length {
            return Err(MoneymatchError::SeriesTooLong {
                requested: max_matches,
                limit: self.config.max_series_length,
            });
        }
        if amount.checked_mul(2).is_none() {
            return Err(MoneymatchError::AmountOverflow);
        }
        self.check_funding(ledger, initiator, amount)?;

        let id = MatchId::derive(
            initiator,
            Utc::now().timestamp_millis(),
            opponent,
            amount,
            self.next_sequence,
        );
        self.registry.ensure_vacant(&id)?;

        let escrow = self.config.escrow_account;
        ledger.transfer_from(&escrow, initiator, &escrow, amount)?;
        self.conservation.record_pull(amount);

        let record = Match::open(id, *initiator, *opponent, amount, max_matches);
        if let Err(err) = self.registry.insert(record) {
            self.refund_after_failed_commit(ledger, initiator, amount);
            return Err(err);
        }
        self.next_sequence += 1;

        tracing::info!(match_id = %id, initiator = %initiator, opponent = %opponent, amount, max_matches, "match sent");
        self.events.emit(MatchEvent::Sent {
            id,
            initiator: *initiator,
            opponent: *opponent,
            amount,
        });
        Ok(id)
    }

    /// The recorded opponent matches the stake; the series starts.
    pub fn accept<L: Ledger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        id: &MatchId,
        amount: Amount,
    ) -> Result<()> {
        let record = self.live(id)?;
        if *caller != record.opponent {
            return Err(MoneymatchError::NotOpponent);
        }
        require_state(record, MatchState::Sent, "accept")?;
        if amount != record.amount {
            return Err(MoneymatchError::AmountMismatch {
                expected: record.amount,
                offered: amount,
            });
        }
        let pot = record
            .amount
            .checked_mul(2)
            .ok_or(MoneymatchError::AmountOverflow)?;
        let mut updated = record.clone();
        self.check_funding(ledger, caller, amount)?;

        let escrow = self.config.escrow_account;
        ledger.transfer_from(&escrow, caller, &escrow, amount)?;
        self.conservation.record_pull(amount);

        updated.pot = pot;
        updated.state = MatchState::Started;
        self.registry.replace(updated)?;
        self.registry.index_opponent(id)?;

        tracing::info!(match_id = %id, opponent = %caller, pot, "match accepted");
        self.events.emit(MatchEvent::Accepted {
            id: *id,
            opponent: *caller,
        });
        Ok(())
    }

    /// The recorded opponent refuses; the initiator gets their stake back and
    /// the record is deleted.
    pub fn decline<L: Ledger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        id: &MatchId,
    ) -> Result<()> {
        let record = self.live(id)?;
        if *caller != record.opponent {
            return Err(MoneymatchError::NotOpponent);
        }
        require_state(record, MatchState::Sent, "decline")?;
        let (initiator, refunded) = (record.initiator, record.amount);

        self.pay(ledger, &[PayoutLeg::new(initiator, refunded)])?;
        self.registry.remove(id)?;

        tracing::info!(match_id = %id, opponent = %caller, initiator = %initiator, refunded, "match declined");
        self.events.emit(MatchEvent::Declined {
            id: *id,
            opponent: *caller,
            refunded,
        });
        Ok(())
    }

    /// `caller` claims `claimed_winner` took the current round.
    ///
    /// On a series win the pot is paid to the winner and the record deleted;
    /// the returned [`VoteOutcome`] is then the only place the final score
    /// survives, besides the event log.
    pub fn agree<L: Ledger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &AccountId,
        id: &MatchId,
        claimed_winner: &AccountId,
    ) -> Result<VoteOutcome> {
        let mut record = self.live(id)?.clone();
        let outcome = cast_vote(
            &mut record,
            caller,
            claimed_winner,
            self.config.max_agreement_attempts,
        )?;

        let agree = MatchEvent::Agree {
            id: *id,
            voter: *caller,
            claimed_winner: *claimed_winner,
        };
        match outcome {
            VoteOutcome::SeriesWon { winner, score } => {
                let payout = record.pot;
                self.pay(ledger, &[PayoutLeg::new(winner, payout)])?;
                self.registry.remove(id)?;

                tracing::info!(match_id = %id, winner = %winner, score, payout, "match won");
                self.events.emit(agree);
                self.events.emit(MatchEvent::Win {
                    id: *id,
                    winner,
                    payout,
                });
            }
            VoteOutcome::Frozen { attempts } => {
                self.registry.replace(record)?;

                tracing::warn!(match_id = %id, attempts, "match frozen after repeated disagreement");
                self.events.emit(agree);
                self.events.emit(MatchEvent::Freeze { id: *id, attempts });
            }
            VoteOutcome::RoundWon { winner, score } => {
                self.registry.replace(record)?;
                tracing::info!(match_id = %id, winner = %winner, score, "round agreed");
                self.events.emit(agree);
            }
            VoteOutcome::Opened | VoteOutcome::Recorded | VoteOutcome::Disagreed { .. } => {
                self.registry.replace(record)?;
                tracing::debug!(match_id = %id, voter = %caller, claimed = %claimed_winner, ?outcome, "vote recorded");
                self.events.emit(agree);
            }
        }
        Ok(outcome)
    }

    /// Unwind a frozen match: each party gets their own stake back.
    ///
    /// The moderator check runs before anything else, so non-moderators learn
    /// nothing about the match.
    pub fn emergency_withdraw<L, M>(
        &mut self,
        ledger: &mut L,
        moderators: &M,
        caller: &AccountId,
        id: &MatchId,
    ) -> Result<()>
    where
        L: Ledger + ?Sized,
        M: ModeratorCheck + ?Sized,
    {
        if !moderators.is_moderator(caller) {
            return Err(MoneymatchError::NotModerator(*caller));
        }
        let record = self.live(id)?;
        match record.state {
            MatchState::Frozen => {}
            MatchState::Started | MatchState::Voting => {
                return Err(MoneymatchError::ConsensusStillPossible {
                    attempts: record.attempts,
                    max: self.config.max_agreement_attempts,
                });
            }
            actual => {
                return Err(MoneymatchError::WrongState {
                    operation: "emergency_withdraw",
                    actual,
                });
            }
        }
        let (initiator, opponent, refunded_each) =
            (record.initiator, record.opponent, record.amount);

        self.pay(
            ledger,
            &[
                PayoutLeg::new(initiator, refunded_each),
                PayoutLeg::new(opponent, refunded_each),
            ],
        )?;
        self.registry.remove(id)?;

        tracing::warn!(match_id = %id, moderator = %caller, refunded_each, "frozen match disputed, stakes returned");
        self.events.emit(MatchEvent::Disputed {
            id: *id,
            moderator: *caller,
            refunded_each,
        });
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The live record, or the zero-valued record. Never fails.
    #[must_use]
    pub fn get_match(&self, id: &MatchId) -> Match {
        self.registry.entry(id).into_record()
    }

    #[must_use]
    pub fn entry(&self, id: &MatchId) -> MatchEntry {
        self.registry.entry(id)
    }

    /// Live matches `account` is indexed under, in insertion order.
    #[must_use]
    pub fn matches_for(&self, account: &AccountId) -> Vec<Match> {
        self.registry.matches_for(account)
    }

    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    /// Check that the escrow account holds exactly what the live matches
    /// commit, and exactly what the engine pulled in minus what it paid out.
    ///
    /// Tokens sent to the escrow account outside the engine also fail this
    /// check.
    pub fn verify_escrow<L: Ledger + ?Sized>(&self, ledger: &L) -> Result<()> {
        let committed = self.committed()?;
        let held = ledger.balance_of(&self.config.escrow_account);
        self.conservation.verify(held, committed).inspect_err(|err| {
            tracing::error!(error = %err, "escrow conservation check failed");
        })
    }

    /// Sum of what every live match has in escrow.
    pub fn committed(&self) -> Result<Amount> {
        self.registry.iter().try_fold(0, |acc: Amount, record| {
            acc.checked_add(record.escrowed())
                .ok_or(MoneymatchError::AmountOverflow)
        })
    }

    #[must_use]
    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &MatchRegistry {
        &self.registry
    }

    #[must_use]
    pub fn conservation(&self) -> &EscrowConservation {
        &self.conservation
    }

    // ── Internals ────────────────────────────────────────────────────

    fn live(&self, id: &MatchId) -> Result<&Match> {
        if id.is_nil() {
            return Err(MoneymatchError::NullMatchId);
        }
        self.registry
            .get(id)
            .ok_or(MoneymatchError::MatchNotFound(*id))
    }

    /// Balance before allowance, so the two failures stay distinguishable
    /// whatever order the ledger checks them in.
    fn check_funding<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        payer: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        let available = ledger.balance_of(payer);
        if available < amount {
            return Err(MoneymatchError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let approved = ledger.allowance(payer, &self.config.escrow_account);
        if approved < amount {
            return Err(MoneymatchError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        Ok(())
    }

    fn pay<L: Ledger + ?Sized>(&mut self, ledger: &mut L, legs: &[PayoutLeg]) -> Result<()> {
        settlement::payout(ledger, &self.config.escrow_account, legs)?;
        self.conservation.record_payout(settlement::total(legs)?);
        Ok(())
    }

    fn refund_after_failed_commit<L: Ledger + ?Sized>(
        &mut self,
        ledger: &mut L,
        payer: &AccountId,
        amount: Amount,
    ) {
        if let Err(err) = self.pay(ledger, &[PayoutLeg::new(*payer, amount)]) {
            tracing::error!(payer = %payer, amount, error = %err, "refund after failed commit did not complete");
        }
    }
}

fn require_state(record: &Match, expected: MatchState, operation: &'static str) -> Result<()> {
    if record.state == expected {
        Ok(())
    } else {
        Err(MoneymatchError::WrongState {
            operation,
            actual: record.state,
        })
    }
}
