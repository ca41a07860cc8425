use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

use crate::error::LedgerError;

/// Largest float that still maps exactly onto an integer amount.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0; // 2^53

/// A finite, non-negative transfer amount.
///
/// Whole values are stored as integers, so `10` and `10.0` are the same
/// amount and encode (and hash) as `10`. Fractional values keep serde_json's
/// shortest round-trip form, e.g. `2.5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Number", into = "Number")]
pub struct Amount(Number);

impl Amount {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or_default()
    }
}

impl TryFrom<Number> for Amount {
    type Error = LedgerError;

    fn try_from(n: Number) -> Result<Self, Self::Error> {
        if n.is_u64() {
            return Ok(Self(n));
        }
        if n.is_i64() {
            return Err(LedgerError::InvalidTransaction(format!(
                "amount must not be negative, got {n}"
            )));
        }
        let value = n.as_f64().unwrap_or(f64::NAN);
        Self::try_from(value)
    }
}

impl TryFrom<f64> for Amount {
    type Error = LedgerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(LedgerError::InvalidTransaction(format!(
                "amount must be a finite non-negative number, got {value}"
            )));
        }
        if value.fract() == 0.0 && value <= MAX_EXACT_FLOAT {
            return Ok(Self(Number::from(value as u64)));
        }
        Number::from_f64(value)
            .map(Self)
            .ok_or_else(|| LedgerError::InvalidTransaction(format!("unsupported amount {value}")))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(Number::from(value))
    }
}

impl From<Amount> for Number {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A value transfer waiting in the pending pool or sealed inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    /// Build a transaction, rejecting blank parties.
    pub fn new(
        sender: &str,
        recipient: &str,
        amount: impl Into<Amount>,
    ) -> Result<Self, LedgerError> {
        let tx = Self {
            sender: sender.trim().to_string(),
            recipient: recipient.trim().to_string(),
            amount: amount.into(),
        };
        tx.check()?;
        Ok(tx)
    }

    /// Field rules shared by locally queued and peer-supplied transactions.
    pub fn check(&self) -> Result<(), LedgerError> {
        if self.sender.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction("sender is required".into()));
        }
        if self.recipient.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "recipient is required".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Amount, Transaction};
    use crate::error::LedgerError;
    use serde_json::{Number, json};

    #[test]
    fn builds_with_all_fields() {
        let tx = Transaction::new("alice", "bob", 10u64).unwrap();
        assert_eq!(tx.sender, "alice");
        assert_eq!(tx.recipient, "bob");
        assert_eq!(tx.amount, Amount::from(10u64));
    }

    #[test]
    fn rejects_blank_parties() {
        assert!(matches!(
            Transaction::new("  ", "bob", 1u64),
            Err(LedgerError::InvalidTransaction(_))
        ));
        assert!(matches!(
            Transaction::new("alice", "", 1u64),
            Err(LedgerError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn zero_amount_is_allowed() {
        let tx = Transaction::new("alice", "bob", 0u64).unwrap();
        assert_eq!(tx.amount.to_string(), "0");
    }

    #[test]
    fn fractional_amounts_keep_their_value() {
        let amount = Amount::try_from(2.5).unwrap();
        assert_eq!(amount.to_string(), "2.5");
        assert_eq!(amount.as_f64(), 2.5);
    }

    #[test]
    fn whole_floats_collapse_to_integers() {
        assert_eq!(Amount::try_from(10.0).unwrap(), Amount::from(10u64));
        let from_json: Amount = serde_json::from_value(json!(10.0)).unwrap();
        assert_eq!(from_json.to_string(), "10");
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(matches!(
            Amount::try_from(Number::from(-1i64)),
            Err(LedgerError::InvalidTransaction(_))
        ));
        assert!(matches!(
            Amount::try_from(-0.5),
            Err(LedgerError::InvalidTransaction(_))
        ));
        assert!(serde_json::from_value::<Amount>(json!(-3)).is_err());
    }

    #[test]
    fn serializes_as_plain_number() {
        let tx = Transaction::new("a", "b", Amount::try_from(2.5).unwrap()).unwrap();
        assert_eq!(
            serde_json::to_value(&tx).unwrap(),
            json!({"sender": "a", "recipient": "b", "amount": 2.5})
        );
    }
}
