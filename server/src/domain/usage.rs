//! Usage Events
//!
//! Recording filament consumption against a spool. A spool whose weight
//! reaches zero is used up and moves to the archive.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};

/// How the amount of a usage event is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageType {
    /// Subtract the amount from the remaining weight
    Consume,
    /// Replace the remaining weight with the amount
    SetRemaining,
}

/// Body of a usage request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub usage_type: UsageType,
    /// Grams
    pub amount: f64,
}

impl Usage {
    pub fn consume(amount: f64) -> Self {
        Self {
            usage_type: UsageType::Consume,
            amount,
        }
    }

    pub fn set_remaining(amount: f64) -> Self {
        Self {
            usage_type: UsageType::SetRemaining,
            amount,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(DomainError::InvalidInput(
                "amount must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Weight after applying this usage to `current`, never below zero
    pub fn next_weight(&self, current: f64) -> f64 {
        let next = match self.usage_type {
            UsageType::Consume => current - self.amount,
            UsageType::SetRemaining => self.amount,
        };
        next.max(0.0)
    }
}

/// Whether a spool at this weight counts as used up
pub fn is_used_up(weight: f64) -> bool {
    weight <= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_subtracts() {
        assert_eq!(Usage::consume(250.0).next_weight(1000.0), 750.0);
    }

    #[test]
    fn test_consume_clamps_at_zero() {
        let next = Usage::consume(1200.0).next_weight(1000.0);
        assert_eq!(next, 0.0);
        assert!(is_used_up(next));
    }

    #[test]
    fn test_set_remaining_replaces() {
        assert_eq!(Usage::set_remaining(420.5).next_weight(1000.0), 420.5);
        assert_eq!(Usage::set_remaining(0.0).next_weight(10.0), 0.0);
    }

    #[test]
    fn test_negative_and_non_finite_amounts_rejected() {
        assert!(Usage::consume(-5.0).validate().is_err());
        assert!(Usage::set_remaining(-0.1).validate().is_err());
        assert!(Usage::consume(f64::NAN).validate().is_err());
        assert!(Usage::consume(f64::INFINITY).validate().is_err());
        assert!(Usage::consume(0.0).validate().is_ok());
    }

    #[test]
    fn test_wire_format() {
        let usage: Usage =
            serde_json::from_str(r#"{"usageType":"setRemaining","amount":300}"#).unwrap();
        assert_eq!(usage, Usage::set_remaining(300.0));

        let usage: Usage = serde_json::from_str(r#"{"usageType":"consume","amount":12.5}"#).unwrap();
        assert_eq!(usage.usage_type, UsageType::Consume);
    }
}
