//! License Lifecycle
//!
//! Decodes payment-provider webhook events and applies them to the
//! license store. Event application is read-then-write with no locking:
//! two concurrent events for the same key are last-write-wins.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::{LicenseError, Result};
use crate::license::{LicenseKey, LicenseRecord};
use crate::store::LicenseStore;

/// Days granted by a sale event carrying no next charge date
const DEFAULT_GRANT_DAYS: i64 = 30;

/// Decoded webhook event
#[derive(Clone, Debug)]
pub enum WebhookEvent {
    /// Purchase or renewal: create the license or overwrite its
    /// `active_until`
    Sale {
        license_key: LicenseKey,
        email: String,
        next_charge: Option<DateTime<Utc>>,
    },

    /// Subscription cancelled: expire the license as of the processing
    /// instant
    Cancelled { license_key: LicenseKey },

    /// Unrecognized event type: acknowledged, never applied
    Other { event_name: String },
}

impl WebhookEvent {
    /// Decode a form-urlencoded webhook payload.
    ///
    /// `event_name`, `email`, and `license_key` must all be present and
    /// non-empty before the event type is looked at. An empty
    /// `next_charge_date` counts as absent; an unparseable one is
    /// malformed.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self> {
        let event_name = required(form, "event_name")?;
        let email = required(form, "email")?;
        let license_key = required(form, "license_key")?;

        match event_name.as_str() {
            "sale" => {
                let next_charge = match form.get("next_charge_date").map(String::as_str) {
                    None | Some("") => None,
                    Some(raw) => Some(
                        DateTime::parse_from_rfc3339(raw)
                            .map_err(|e| {
                                LicenseError::MalformedEvent(format!(
                                    "bad next_charge_date {raw:?}: {e}"
                                ))
                            })?
                            .with_timezone(&Utc),
                    ),
                };

                Ok(WebhookEvent::Sale {
                    license_key: LicenseKey::new(license_key),
                    email,
                    next_charge,
                })
            }
            "subscription_cancelled" => Ok(WebhookEvent::Cancelled {
                license_key: LicenseKey::new(license_key),
            }),
            _ => Ok(WebhookEvent::Other { event_name }),
        }
    }
}

fn required(form: &HashMap<String, String>, field: &str) -> Result<String> {
    match form.get(field) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(LicenseError::MalformedEvent(format!(
            "missing field {field}"
        ))),
    }
}

/// Result of applying a webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// Sale applied; the license is active until the given instant
    Renewed { active_until: DateTime<Utc> },

    /// Cancellation applied, or acknowledged for an unknown key
    Cancelled,

    /// Event type not recognized; nothing changed
    Ignored { event_name: String },
}

/// The single authority for license validity and lifecycle transitions
pub struct LifecycleManager<S: LicenseStore> {
    store: Arc<S>,
}

impl<S: LicenseStore> LifecycleManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Check that a license exists and has not expired at `now`.
    ///
    /// Missing and expired keys both come back as `AccessDenied`; the
    /// caller cannot tell whether the key ever existed.
    pub async fn validate(&self, key: &LicenseKey, now: DateTime<Utc>) -> Result<LicenseRecord> {
        match self.store.get(key).await? {
            Some(record) if record.is_valid_at(now) => Ok(record),
            _ => Err(LicenseError::AccessDenied),
        }
    }

    /// Apply a webhook event to the store as of `now`.
    pub async fn apply(&self, event: WebhookEvent, now: DateTime<Utc>) -> Result<LifecycleOutcome> {
        match event {
            WebhookEvent::Sale {
                license_key,
                email,
                next_charge,
            } => {
                let active_until =
                    next_charge.unwrap_or_else(|| now + Duration::days(DEFAULT_GRANT_DAYS));

                if self.store.get(&license_key).await?.is_some() {
                    // Renewal replaces active_until outright; it does
                    // not extend from the previous value.
                    self.store.set_active_until(&license_key, active_until).await?;
                    tracing::info!(license_key = %license_key, %active_until, "License renewed");
                } else {
                    let record = LicenseRecord::new(license_key.clone(), email, active_until, now);
                    self.store.insert(&record).await?;
                    tracing::info!(license_key = %license_key, %active_until, "License created");
                }

                Ok(LifecycleOutcome::Renewed { active_until })
            }

            WebhookEvent::Cancelled { license_key } => {
                // Cancelling an unknown key is acknowledged without
                // creating a record.
                if self.store.get(&license_key).await?.is_some() {
                    self.store.set_active_until(&license_key, now).await?;
                    tracing::info!(license_key = %license_key, "License cancelled");
                }

                Ok(LifecycleOutcome::Cancelled)
            }

            WebhookEvent::Other { event_name } => {
                tracing::debug!(event_name = %event_name, "Ignoring webhook event");
                Ok(LifecycleOutcome::Ignored { event_name })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLicenseStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (Arc<MemoryLicenseStore>, LifecycleManager<MemoryLicenseStore>) {
        let store = Arc::new(MemoryLicenseStore::new());
        (store.clone(), LifecycleManager::new(store))
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn sale_form(key: &str, next_charge: Option<&str>) -> HashMap<String, String> {
        let mut pairs = vec![
            ("event_name", "sale"),
            ("email", "buyer@example.com"),
            ("license_key", key),
        ];
        if let Some(date) = next_charge {
            pairs.push(("next_charge_date", date));
        }
        form(&pairs)
    }

    async fn apply_sale(
        manager: &LifecycleManager<MemoryLicenseStore>,
        key: &str,
        next_charge: Option<&str>,
        at: DateTime<Utc>,
    ) -> LifecycleOutcome {
        let event = WebhookEvent::from_form(&sale_form(key, next_charge)).unwrap();
        manager.apply(event, at).await.unwrap()
    }

    #[tokio::test]
    async fn test_absent_key_is_invalid() {
        let (_store, manager) = setup();
        let err = manager
            .validate(&LicenseKey::new("missing"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, LicenseError::AccessDenied));
    }

    #[tokio::test]
    async fn test_validity_boundary_is_strict() {
        let (_store, manager) = setup();
        apply_sale(&manager, "KEY-1", None, now()).await;

        let until = now() + Duration::days(30);
        let key = LicenseKey::new("KEY-1");
        assert!(manager.validate(&key, until - Duration::seconds(1)).await.is_ok());
        assert!(manager.validate(&key, until).await.is_err());
        assert!(manager.validate(&key, until + Duration::seconds(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_sale_with_next_charge_sets_exact_instant() {
        let (store, manager) = setup();
        let outcome = apply_sale(&manager, "KEY-1", Some("2025-06-19T00:00:00Z"), now()).await;

        let expected = Utc.with_ymd_and_hms(2025, 6, 19, 0, 0, 0).unwrap();
        assert_eq!(
            outcome,
            LifecycleOutcome::Renewed {
                active_until: expected
            }
        );

        let record = store.get(&LicenseKey::new("KEY-1")).await.unwrap().unwrap();
        assert_eq!(record.active_until, expected);
        assert_eq!(record.email, "buyer@example.com");
        assert_eq!(record.created_at, now());
    }

    #[tokio::test]
    async fn test_sale_without_next_charge_grants_thirty_days() {
        let (store, manager) = setup();
        let outcome = apply_sale(&manager, "KEY-1", None, now()).await;

        let expected = now() + Duration::days(30);
        assert_eq!(
            outcome,
            LifecycleOutcome::Renewed {
                active_until: expected
            }
        );

        let record = store.get(&LicenseKey::new("KEY-1")).await.unwrap().unwrap();
        assert_eq!(record.active_until, expected);
    }

    #[tokio::test]
    async fn test_renewal_overwrites_instead_of_extending() {
        let (store, manager) = setup();
        apply_sale(&manager, "KEY-1", Some("2025-07-01T00:00:00Z"), now()).await;

        // A later event with an earlier charge date shortens the grant.
        apply_sale(&manager, "KEY-1", Some("2025-06-19T00:00:00Z"), now()).await;

        let record = store.get(&LicenseKey::new("KEY-1")).await.unwrap().unwrap();
        assert_eq!(
            record.active_until,
            Utc.with_ymd_and_hms(2025, 6, 19, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_renewal_keeps_email_and_created_at() {
        let (store, manager) = setup();
        apply_sale(&manager, "KEY-1", None, now()).await;

        let later = now() + Duration::days(10);
        let mut renewal = sale_form("KEY-1", None);
        renewal.insert("email".into(), "other@example.com".into());
        manager
            .apply(WebhookEvent::from_form(&renewal).unwrap(), later)
            .await
            .unwrap();

        let record = store.get(&LicenseKey::new("KEY-1")).await.unwrap().unwrap();
        assert_eq!(record.email, "buyer@example.com");
        assert_eq!(record.created_at, now());
        assert_eq!(record.active_until, later + Duration::days(30));
    }

    #[tokio::test]
    async fn test_identical_sales_are_idempotent() {
        let (store, manager) = setup();
        let first = apply_sale(&manager, "KEY-1", Some("2025-06-19T00:00:00Z"), now()).await;
        let second = apply_sale(&manager, "KEY-1", Some("2025-06-19T00:00:00Z"), now()).await;

        assert_eq!(first, second);
        let record = store.get(&LicenseKey::new("KEY-1")).await.unwrap().unwrap();
        assert_eq!(
            record.active_until,
            Utc.with_ymd_and_hms(2025, 6, 19, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_cancellation_expires_immediately() {
        let (store, manager) = setup();
        apply_sale(&manager, "KEY-1", None, now()).await;

        let cancel_at = now() + Duration::days(3);
        let event = WebhookEvent::from_form(&form(&[
            ("event_name", "subscription_cancelled"),
            ("email", "buyer@example.com"),
            ("license_key", "KEY-1"),
        ]))
        .unwrap();
        let outcome = manager.apply(event, cancel_at).await.unwrap();

        assert_eq!(outcome, LifecycleOutcome::Cancelled);
        let record = store.get(&LicenseKey::new("KEY-1")).await.unwrap().unwrap();
        assert_eq!(record.active_until, cancel_at);
        assert!(manager.validate(&LicenseKey::new("KEY-1"), cancel_at).await.is_err());
    }

    #[tokio::test]
    async fn test_cancelling_unknown_key_is_a_silent_noop() {
        let (store, manager) = setup();
        let event = WebhookEvent::from_form(&form(&[
            ("event_name", "subscription_cancelled"),
            ("email", "buyer@example.com"),
            ("license_key", "NEVER-SOLD"),
        ]))
        .unwrap();

        let outcome = manager.apply(event, now()).await.unwrap();
        assert_eq!(outcome, LifecycleOutcome::Cancelled);
        assert!(store.get(&LicenseKey::new("NEVER-SOLD")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_event_never_mutates() {
        let (store, manager) = setup();
        let event = WebhookEvent::from_form(&form(&[
            ("event_name", "refund"),
            ("email", "buyer@example.com"),
            ("license_key", "KEY-1"),
        ]))
        .unwrap();

        let outcome = manager.apply(event, now()).await.unwrap();
        assert_eq!(
            outcome,
            LifecycleOutcome::Ignored {
                event_name: "refund".into()
            }
        );
        assert!(store.get(&LicenseKey::new("KEY-1")).await.unwrap().is_none());
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        for missing in ["event_name", "email", "license_key"] {
            let mut payload = sale_form("KEY-1", None);
            payload.remove(missing);
            assert!(matches!(
                WebhookEvent::from_form(&payload),
                Err(LicenseError::MalformedEvent(_))
            ));
        }
    }

    #[test]
    fn test_empty_fields_are_malformed() {
        let mut payload = sale_form("KEY-1", None);
        payload.insert("email".into(), String::new());
        assert!(matches!(
            WebhookEvent::from_form(&payload),
            Err(LicenseError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_empty_next_charge_counts_as_absent() {
        let payload = sale_form("KEY-1", Some(""));
        match WebhookEvent::from_form(&payload).unwrap() {
            WebhookEvent::Sale { next_charge, .. } => assert!(next_charge.is_none()),
            other => panic!("expected sale, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_next_charge_is_malformed() {
        let payload = sale_form("KEY-1", Some("next tuesday"));
        assert!(matches!(
            WebhookEvent::from_form(&payload),
            Err(LicenseError::MalformedEvent(_))
        ));
    }
}
