//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::money::Money;
use super::result::Error;

/// Longest accepted idempotency token
pub const MAX_TRANSACTION_ID_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Applied,
    Rejected,
}

/// Why a transaction ended up REJECTED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    AccountNotFound,
    AccountClosed,
    InsufficientFunds,
    CurrencyMismatch,
    BalanceOverflow,
}

macro_rules! string_enum {
    ($ty:ty { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(Error::validation(format!(
                        "unknown {} '{}'",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

string_enum!(TransactionKind {
    Deposit => "DEPOSIT",
    Withdrawal => "WITHDRAWAL",
    Transfer => "TRANSFER",
});

string_enum!(TransactionStatus {
    Pending => "PENDING",
    Applied => "APPLIED",
    Rejected => "REJECTED",
});

string_enum!(RejectionReason {
    AccountNotFound => "AccountNotFound",
    AccountClosed => "AccountClosed",
    InsufficientFunds => "InsufficientFunds",
    CurrencyMismatch => "CurrencyMismatch",
    BalanceOverflow => "BalanceOverflow",
});

/// A request to move money, as handed to the ledger engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Idempotency token
    pub id: String,
    pub kind: TransactionKind,
    pub source_account_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    pub amount: Money,
}

impl TransactionRequest {
    pub fn deposit(id: impl Into<String>, destination: Uuid, amount: Money) -> Self {
        Self {
            id: id.into(),
            kind: TransactionKind::Deposit,
            source_account_id: None,
            destination_account_id: Some(destination),
            amount,
        }
    }

    pub fn withdrawal(id: impl Into<String>, source: Uuid, amount: Money) -> Self {
        Self {
            id: id.into(),
            kind: TransactionKind::Withdrawal,
            source_account_id: Some(source),
            destination_account_id: None,
            amount,
        }
    }

    pub fn transfer(id: impl Into<String>, source: Uuid, destination: Uuid, amount: Money) -> Self {
        Self {
            id: id.into(),
            kind: TransactionKind::Transfer,
            source_account_id: Some(source),
            destination_account_id: Some(destination),
            amount,
        }
    }

    /// Shape checks that need no storage access
    pub fn validate(&self) -> Result<(), Error> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(Error::validation("transaction id cannot be empty"));
        }
        if id.len() != self.id.len() {
            return Err(Error::validation("transaction id cannot have surrounding whitespace"));
        }
        if self.id.len() > MAX_TRANSACTION_ID_LEN {
            return Err(Error::validation(format!(
                "transaction id exceeds {} characters",
                MAX_TRANSACTION_ID_LEN
            )));
        }
        if !self.amount.is_positive() {
            return Err(Error::validation("amount must be positive"));
        }

        match (self.kind, self.source_account_id, self.destination_account_id) {
            (TransactionKind::Deposit, None, Some(_)) => Ok(()),
            (TransactionKind::Deposit, _, _) => Err(Error::validation(
                "deposit requires a destination account and no source account",
            )),
            (TransactionKind::Withdrawal, Some(_), None) => Ok(()),
            (TransactionKind::Withdrawal, _, _) => Err(Error::validation(
                "withdrawal requires a source account and no destination account",
            )),
            (TransactionKind::Transfer, Some(source), Some(destination)) => {
                if source == destination {
                    Err(Error::validation("transfer source and destination must differ"))
                } else {
                    Ok(())
                }
            }
            (TransactionKind::Transfer, _, _) => Err(Error::validation(
                "transfer requires both a source and a destination account",
            )),
        }
    }

    /// Accounts touched by this request, in global acquisition order
    pub fn account_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .source_account_id
            .into_iter()
            .chain(self.destination_account_id)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Fingerprint of everything except the id, used to detect a token reused
    /// for a different request
    pub fn request_hash(&self) -> String {
        let canonical = format!(
            "{}|{}|{}|{}",
            self.kind,
            self.source_account_id.map(|id| id.to_string()).unwrap_or_default(),
            self.destination_account_id.map(|id| id.to_string()).unwrap_or_default(),
            self.amount.minor()
        );
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A transaction record as kept in the transaction log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub source_account_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    pub amount: Money,
    pub status: TransactionStatus,
    pub request_hash: String,
    /// Only set when status is REJECTED
    pub rejection_reason: Option<RejectionReason>,
    pub created_at: DateTime<Utc>,
    /// Only set when status is APPLIED
    pub applied_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// First sighting of a request: a PENDING record
    pub fn pending(request: &TransactionRequest) -> Self {
        Self {
            id: request.id.clone(),
            kind: request.kind,
            source_account_id: request.source_account_id,
            destination_account_id: request.destination_account_id,
            amount: request.amount,
            status: TransactionStatus::Pending,
            request_hash: request.request_hash(),
            rejection_reason: None,
            created_at: Utc::now(),
            applied_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != TransactionStatus::Pending
    }

    pub fn matches(&self, request: &TransactionRequest) -> bool {
        self.request_hash == request.request_hash()
    }

    /// Signed effect of this transaction on one account's balance once applied
    pub fn net_effect_on(&self, account_id: Uuid) -> Money {
        if self.status != TransactionStatus::Applied {
            return Money::ZERO;
        }
        let mut minor = 0i64;
        if self.destination_account_id == Some(account_id) {
            minor += self.amount.minor();
        }
        if self.source_account_id == Some(account_id) {
            minor -= self.amount.minor();
        }
        Money::from_minor(minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(v: i64) -> Money {
        Money::from_minor(v)
    }

    #[test]
    fn test_validate_accepts_well_formed_requests() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(TransactionRequest::deposit("d1", a, cents(1)).validate().is_ok());
        assert!(TransactionRequest::withdrawal("w1", a, cents(1)).validate().is_ok());
        assert!(TransactionRequest::transfer("t1", a, b, cents(1)).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_amounts() {
        let a = Uuid::new_v4();
        let err = TransactionRequest::deposit("d1", a, cents(0)).validate().unwrap_err();
        assert!(err.to_string().contains("positive"));
        assert!(TransactionRequest::withdrawal("w1", a, cents(-5)).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_self_transfer() {
        let a = Uuid::new_v4();
        let err = TransactionRequest::transfer("t1", a, a, cents(10)).validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_mismatched_account_shape() {
        let a = Uuid::new_v4();
        let mut req = TransactionRequest::deposit("d1", a, cents(10));
        req.source_account_id = Some(Uuid::new_v4());
        assert!(req.validate().is_err());

        let mut req = TransactionRequest::transfer("t1", a, Uuid::new_v4(), cents(10));
        req.destination_account_id = None;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ids() {
        let a = Uuid::new_v4();
        assert!(TransactionRequest::deposit("", a, cents(1)).validate().is_err());
        assert!(TransactionRequest::deposit(" x ", a, cents(1)).validate().is_err());
        let long = "x".repeat(MAX_TRANSACTION_ID_LEN + 1);
        assert!(TransactionRequest::deposit(long, a, cents(1)).validate().is_err());
    }

    #[test]
    fn test_account_ids_are_sorted_regardless_of_direction() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let forward = TransactionRequest::transfer("t1", a, b, cents(1)).account_ids();
        let backward = TransactionRequest::transfer("t2", b, a, cents(1)).account_ids();
        assert_eq!(forward, backward);
        assert!(forward[0] < forward[1]);
    }

    #[test]
    fn test_request_hash_ignores_id_but_not_payload() {
        let a = Uuid::new_v4();
        let one = TransactionRequest::deposit("d1", a, cents(100));
        let two = TransactionRequest::deposit("d2", a, cents(100));
        let three = TransactionRequest::deposit("d1", a, cents(101));
        assert_eq!(one.request_hash(), two.request_hash());
        assert_ne!(one.request_hash(), three.request_hash());
        assert_eq!(one.request_hash().len(), 64);
    }

    #[test]
    fn test_net_effect_only_counts_applied() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut tx = Transaction::pending(&TransactionRequest::transfer("t1", a, b, cents(300)));
        assert_eq!(tx.net_effect_on(a), Money::ZERO);

        tx.status = TransactionStatus::Applied;
        assert_eq!(tx.net_effect_on(a), cents(-300));
        assert_eq!(tx.net_effect_on(b), cents(300));
        assert_eq!(tx.net_effect_on(Uuid::new_v4()), Money::ZERO);
    }

    #[test]
    fn test_string_round_trip_for_stored_enums() {
        assert_eq!("TRANSFER".parse::<TransactionKind>().unwrap(), TransactionKind::Transfer);
        assert_eq!("APPLIED".parse::<TransactionStatus>().unwrap(), TransactionStatus::Applied);
        assert_eq!(
            "InsufficientFunds".parse::<RejectionReason>().unwrap(),
            RejectionReason::InsufficientFunds
        );
        assert!("bogus".parse::<TransactionStatus>().is_err());
    }
}
