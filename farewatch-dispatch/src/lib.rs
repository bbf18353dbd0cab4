pub mod dispatcher;
pub mod ledger;
pub mod notifier;
pub mod pacer;
pub mod recipient;

pub use dispatcher::{DispatchError, DispatchSummary, Dispatcher};
pub use ledger::{Channel, DeliveryLedger, DeliveryRecord};
pub use notifier::{HttpNotifier, Notifier, NotifyError};
pub use pacer::{FixedDelayPacer, NoopPacer, Pacer};
pub use recipient::{PlanTier, Recipient, RecipientDirectory, RecipientStatus};
