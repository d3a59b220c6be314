//! Identifiers used throughout Moneymatch.
//!
//! Accounts are ed25519 public keys. Match ids are UUID-shaped digests
//! derived from the match's opening parameters plus an engine sequence.

use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants;

/// Token amounts in base units.
pub type Amount = u128;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of a ledger account: the raw ed25519 public key (32 bytes).
///
/// The all-zero key is [`AccountId::NULL`] and stands for "nobody" in match
/// records (unset winner, empty agreement slot, blank record).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub const NULL: Self = Self([0u8; 32]);

    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", hex::encode(&self.0[..8]))
    }
}

/// Deterministic and random account constructors for tests.
/// **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AccountId {
    /// Account whose key pair is derived from a fixed 32-byte secret.
    #[must_use]
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing = ed25519_dalek::SigningKey::from_bytes(&seed);
        Self::from_verifying_key(&signing.verifying_key())
    }

    /// Account backed by a freshly generated key pair.
    #[must_use]
    pub fn random() -> Self {
        let signing = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        Self::from_verifying_key(&signing.verifying_key())
    }
}

// ---------------------------------------------------------------------------
// MatchId
// ---------------------------------------------------------------------------

/// Unique identifier of a match.
///
/// The nil UUID is reserved: it is the id of the zero-valued record and is
/// rejected by every lifecycle operation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub const NIL: Self = Self(Uuid::nil());

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Derive the id of a new match.
    ///
    /// `SHA-256(domain || initiator || timestamp_ms || opponent || amount || sequence)`,
    /// truncated to 16 bytes. `sequence` is the engine's monotonic counter so
    /// two matches opened with identical parameters in the same millisecond
    /// still get distinct ids.
    #[must_use]
    pub fn derive(
        initiator: &AccountId,
        timestamp_ms: i64,
        opponent: &AccountId,
        amount: Amount,
        sequence: u64,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::MATCH_ID_DOMAIN);
        hasher.update(initiator.as_bytes());
        hasher.update(timestamp_ms.to_le_bytes());
        hasher.update(opponent.as_bytes());
        hasher.update(amount.to_le_bytes());
        hasher.update(sequence.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash[..16]);
        Self(Uuid::from_bytes(bytes))
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
