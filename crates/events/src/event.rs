use chrono::{DateTime, Utc};

/// A fact worth telling other systems about.
///
/// Only produced for changes that actually committed; consumers may receive
/// the same fact more than once.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable name, e.g. `"warehouse.updated"`.
    fn event_type(&self) -> &'static str;

    /// Schema version of the payload.
    fn schema_version(&self) -> u32;

    /// Business key of the record the event is about.
    fn subject(&self) -> &str;

    fn occurred_at(&self) -> DateTime<Utc>;
}
