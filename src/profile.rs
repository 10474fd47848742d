// Per-iteration profile snapshot: the active session combined with a fresh
// balance (and, for prepaid lines, loyalty) lookup. Never cached, never
// persisted.

use crate::error::CollaboratorError;
use crate::session::{Session, SubscriptionKind};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Balance {
    /// Remaining balance in the smallest currency unit.
    #[serde(default)]
    pub remaining: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expired_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Tiering {
    #[serde(default)]
    pub current_point: Option<i64>,
    #[serde(default)]
    pub tier: Option<i64>,
}

pub trait ProfileFetcher {
    fn balance(&self, session: &Session) -> Result<Balance, CollaboratorError>;

    /// Only meaningful for prepaid lines.
    fn tiering(&self, session: &Session) -> Result<Tiering, CollaboratorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loyalty {
    Summary { points: i64, tier: i64 },
    NotApplicable,
}

impl fmt::Display for Loyalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary { points, tier } => write!(f, "Points: {} | Tier: {}", points, tier),
            Self::NotApplicable => f.write_str("Points: N/A | Tier: N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub number: String,
    pub subscription_type: SubscriptionKind,
    pub balance: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub loyalty: Loyalty,
}

impl ProfileSnapshot {
    /// Build a snapshot for `session`. The tiering call is made only for
    /// prepaid lines; any collaborator failure fails the whole snapshot.
    pub fn fetch(
        session: &Session,
        fetcher: &dyn ProfileFetcher,
    ) -> Result<Self, CollaboratorError> {
        let balance = fetcher.balance(session)?;

        let loyalty = if session.subscription_type == SubscriptionKind::Prepaid {
            let tiering = fetcher.tiering(session)?;
            Loyalty::Summary {
                points: tiering.current_point.unwrap_or(0),
                tier: tiering.tier.unwrap_or(0),
            }
        } else {
            Loyalty::NotApplicable
        };

        Ok(Self {
            number: session.number.clone(),
            subscription_type: session.subscription_type.clone(),
            balance: balance.remaining,
            expires_at: balance
                .expired_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            loyalty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{session, FakeProfiles};

    #[test]
    fn prepaid_gets_loyalty_summary() {
        let fetcher = FakeProfiles::default();
        let s = session("628111", SubscriptionKind::Prepaid);
        let snap = ProfileSnapshot::fetch(&s, &fetcher).unwrap();
        assert!(matches!(snap.loyalty, Loyalty::Summary { .. }));
        assert_eq!(fetcher.tiering_calls(), 1);
    }

    #[test]
    fn non_prepaid_gets_sentinel_and_no_tiering_call() {
        for kind in [SubscriptionKind::Postpaid, SubscriptionKind::Other("PRIOHYBRID".into())] {
            let fetcher = FakeProfiles::default();
            let snap = ProfileSnapshot::fetch(&session("628111", kind), &fetcher).unwrap();
            assert_eq!(snap.loyalty, Loyalty::NotApplicable);
            assert_eq!(snap.loyalty.to_string(), "Points: N/A | Tier: N/A");
            assert_eq!(fetcher.tiering_calls(), 0);
        }
    }

    #[test]
    fn missing_tiering_numbers_default_to_zero() {
        let fetcher = FakeProfiles::default();
        fetcher.set_tiering(Tiering::default());
        let s = session("628111", SubscriptionKind::Prepaid);
        let snap = ProfileSnapshot::fetch(&s, &fetcher).unwrap();
        assert_eq!(snap.loyalty.to_string(), "Points: 0 | Tier: 0");
    }

    #[test]
    fn balance_and_expiry_come_from_fetcher() {
        let fetcher = FakeProfiles::default();
        fetcher.set_balance("628111", 25_000, 1_700_000_000);
        let s = session("628111", SubscriptionKind::Postpaid);
        let snap = ProfileSnapshot::fetch(&s, &fetcher).unwrap();
        assert_eq!(snap.balance, Some(25_000));
        assert_eq!(snap.expires_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn tiering_failure_fails_snapshot() {
        let fetcher = FakeProfiles::default();
        fetcher.fail_tiering(CollaboratorError::transient("timeout"));
        let res = ProfileSnapshot::fetch(&session("628111", SubscriptionKind::Prepaid), &fetcher);
        assert!(res.is_err());
    }
}
