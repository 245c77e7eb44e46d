//! Bookkeeping for a single physical connection.
use crate::amqp::{BrokerChannel, BrokerConnection};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::debug;

/// One physical connection and every channel that has been opened on it.
///
/// Channels are leased out to callers, but the entry keeps a handle to each of them
/// so that they can be torn down when the pool is closed.
pub(super) struct Entry {
    connection: Box<dyn BrokerConnection>,
    channels: Vec<Arc<dyn BrokerChannel>>,
}

impl Entry {
    pub(super) fn new(connection: Box<dyn BrokerConnection>) -> Self {
        Self {
            connection,
            channels: Vec::new(),
        }
    }

    /// `true` if another channel can be opened without exceeding `channels_per_connection`.
    pub(super) fn has_capacity(&self, channels_per_connection: usize) -> bool {
        self.channels.len() < channels_per_connection
    }

    pub(super) fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Open a new channel on the connection and track it.
    ///
    /// The channel is only tracked if the broker opened it successfully.
    pub(super) async fn open_channel(&mut self) -> Result<Arc<dyn BrokerChannel>, super::Error> {
        let channel = self
            .connection
            .open_channel()
            .await
            .map_err(super::Error::ChannelOpen)?;
        self.channels.push(Arc::clone(&channel));
        Ok(channel)
    }

    /// Best-effort teardown: every channel first, then the connection.
    ///
    /// Failures are logged and otherwise ignored; most channels have already been closed by
    /// the publish call that leased them.
    pub(super) async fn close(&self) {
        for outcome in join_all(self.channels.iter().map(|channel| channel.close())).await {
            if let Err(e) = outcome {
                debug!(error = ?e, "Failed to close RabbitMq channel during pool shutdown");
            }
        }
        if let Err(e) = self.connection.close().await {
            debug!(error = ?e, "Failed to close RabbitMq connection during pool shutdown");
        }
    }
}
