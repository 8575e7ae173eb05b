//! Channel-based data source.
//!
//! Receives payloads via a tokio watch channel. Useful when metrics are
//! pushed from elsewhere in the process rather than fetched.

use tokio::sync::watch;

use super::{MetricsPayload, MetricsSource, QueryKey, SourceUpdate};

/// A data source fed through a watch channel.
///
/// The producer publishes whatever payload is current; each one is tagged
/// with the key most recently requested by the app.
///
/// # Example
///
/// ```
/// use pikawatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("embedded");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Option<MetricsPayload>>,
    description: String,
    key: Option<QueryKey>,
}

impl ChannelSource {
    /// Create a new channel source.
    pub fn new(receiver: watch::Receiver<Option<MetricsPayload>>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            key: None,
        }
    }

    /// Create a channel pair. Send `Some(payload)` to publish data.
    pub fn create(source_description: &str) -> (watch::Sender<Option<MetricsPayload>>, Self) {
        let (tx, rx) = watch::channel(None);
        (tx, Self::new(rx, source_description))
    }
}

impl MetricsSource for ChannelSource {
    fn request(&mut self, key: QueryKey) {
        if self.key.as_ref() == Some(&key) {
            return;
        }
        self.key = Some(key);
        // Re-deliver the current payload under the new key
        self.receiver.mark_changed();
    }

    fn poll(&mut self) -> Option<SourceUpdate> {
        let key = self.key.clone()?;
        if !self.receiver.has_changed().unwrap_or(false) {
            return None;
        }
        let payload = self.receiver.borrow_and_update().clone()?;
        Some(SourceUpdate { key, payload })
    }

    fn refresh(&mut self) {
        self.receiver.mark_changed();
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::tests::cpu_key;
    use pikawatch_types::MetricSeries;

    #[test]
    fn test_channel_source_requires_key() {
        let (tx, mut source) = ChannelSource::create("test");
        tx.send(Some(MetricsPayload::Series(Vec::new()))).unwrap();
        assert!(source.poll().is_none());

        source.request(cpu_key("agent-1"));
        let update = source.poll().unwrap();
        assert_eq!(update.key, cpu_key("agent-1"));
    }

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");
        source.request(cpu_key("agent-1"));

        // Nothing published yet
        assert!(source.poll().is_none());

        let payload = MetricsPayload::Series(vec![MetricSeries::new("usage").point(1, 2.0)]);
        tx.send(Some(payload.clone())).unwrap();

        let update = source.poll().unwrap();
        assert_eq!(update.payload, payload);

        // No change, so poll returns None
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_channel_source_rekey_redelivers() {
        let (tx, mut source) = ChannelSource::create("test");
        source.request(cpu_key("a"));
        tx.send(Some(MetricsPayload::Series(Vec::new()))).unwrap();
        assert!(source.poll().is_some());

        source.request(cpu_key("a"));
        assert!(source.poll().is_none());

        source.request(cpu_key("b"));
        assert_eq!(source.poll().unwrap().key, cpu_key("b"));

        source.refresh();
        assert!(source.poll().is_some());
    }

    #[test]
    fn test_channel_source_description() {
        let (_tx, source) = ChannelSource::create("embedded");
        assert_eq!(source.description(), "channel: embedded");
        assert!(source.error().is_none());
    }
}
