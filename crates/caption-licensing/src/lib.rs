//! # caption-licensing
//!
//! License lifecycle management driven by payment-provider webhooks.
//!
//! A license is a single record per key with an `active_until` instant.
//! `sale` events create or renew a license (renewal overwrites the
//! instant, it never extends), `subscription_cancelled` expires the
//! record as of the processing instant, and validity is re-evaluated
//! lazily against the clock on every check. There is no separate
//! revoked or expired state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caption_licensing::{LifecycleManager, WebhookEvent};
//!
//! let manager = LifecycleManager::new(store);
//! let event = WebhookEvent::from_form(&form)?;
//! let outcome = manager.apply(event, Utc::now()).await?;
//! ```

pub mod error;
pub mod license;
pub mod lifecycle;
pub mod store;

pub use error::{LicenseError, Result};
pub use license::{LicenseKey, LicenseRecord};
pub use lifecycle::{LifecycleManager, LifecycleOutcome, WebhookEvent};
pub use store::{LicenseStore, MemoryLicenseStore};
