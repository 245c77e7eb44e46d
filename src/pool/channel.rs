use super::connection::Entry;
use super::Error;
use crate::amqp::{AmqpConnector, BrokerChannel, Connector};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// `ChannelPool` multiplexes channels over a bounded number of channels per connection.
///
/// Every call to [`ChannelPool::channel`] opens a fresh channel on the most recently dialed
/// connection. Once that connection holds `channels_per_connection` channels, the next call
/// dials a new connection through the pool's [`Connector`].
///
/// `ChannelPool` is a cheap handle: clones share the same connections.
#[derive(Clone)]
pub struct ChannelPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    connector: Box<dyn Connector>,
    channels_per_connection: usize,
    /// One-way flag, flipped by the first call to `close`.
    closed: AtomicBool,
    /// The last entry is the current connection slot.
    entries: RwLock<Vec<Entry>>,
}

impl ChannelPool {
    /// Start building a [`ChannelPool`] on top of a [`Connector`].
    pub fn builder<C: Connector>(connector: C) -> ChannelPoolBuilder {
        ChannelPoolBuilder {
            connector: Box::new(connector),
            channels_per_connection: DEFAULT_CHANNELS_PER_CONNECTION,
        }
    }

    /// Build a pool dialing `url`, opening at most `channels_per_connection` channels on each connection.
    ///
    /// No connection is established until the first channel is requested.
    pub fn dial(url: &str, channels_per_connection: usize) -> Result<Self, Error> {
        let connector = AmqpConnector::from_url(url).map_err(Error::InvalidUri)?;
        Self::builder(connector)
            .channels_per_connection(channels_per_connection)
            .build()
    }

    /// Get a ready-to-use channel.
    ///
    /// The whole operation is serialised: the pool state is locked while a new connection
    /// is dialed or a channel is opened.
    ///
    /// If dialing fails no connection slot is recorded. If opening the channel fails the
    /// error is returned as is, without trying to reconnect.
    #[tracing::instrument(name = "pool_channel", level = "debug", skip(self))]
    pub async fn channel(&self) -> Result<Arc<dyn BrokerChannel>, Error> {
        let mut entries = self.inner.entries.write().await;
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }

        let size = self.inner.channels_per_connection;
        let reuse = entries.last().map_or(false, |entry| entry.has_capacity(size));
        if !reuse {
            let connection = self.inner.connector.connect().await.map_err(Error::Dial)?;
            entries.push(Entry::new(connection));
            debug!(connections = entries.len(), "Dialed a new RabbitMq connection");
        }

        let current = entries.len() - 1;
        entries[current].open_channel().await
    }

    /// Close every channel and every connection owned by the pool.
    ///
    /// Only the first call does any work, any later call returns [`Error::AlreadyClosed`].
    /// Errors raised while closing individual channels or connections are not reported.
    #[tracing::instrument(name = "pool_close", skip(self))]
    pub async fn close(&self) -> Result<(), Error> {
        if self
            .inner
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyClosed);
        }

        // Hold the write lock for the whole teardown so that no channel can be opened
        // on a connection we are about to close.
        let entries = self.inner.entries.write().await;
        for entry in entries.iter() {
            entry.close().await;
        }
        debug!(connections = entries.len(), "Closed RabbitMq channel pool");
        Ok(())
    }

    /// `true` once [`ChannelPool::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Number of connections dialed so far.
    pub async fn connection_count(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    /// Number of channels opened so far, across all connections.
    pub async fn channel_count(&self) -> usize {
        self.inner
            .entries
            .read()
            .await
            .iter()
            .map(Entry::channel_count)
            .sum()
    }

    /// The maximum number of channels opened on a single connection.
    pub fn channels_per_connection(&self) -> usize {
        self.inner.channels_per_connection
    }
}

const DEFAULT_CHANNELS_PER_CONNECTION: usize = 10;

/// A builder for [`ChannelPool`].
///
/// Use [`ChannelPool::builder`] as entrypoint.
pub struct ChannelPoolBuilder {
    connector: Box<dyn Connector>,
    channels_per_connection: usize,
}

impl ChannelPoolBuilder {
    /// How many channels can be opened on a connection before a new one is dialed.
    /// Defaults to 10 if left unspecified. It must be at least 1.
    #[must_use]
    pub fn channels_per_connection(mut self, channels_per_connection: usize) -> Self {
        self.channels_per_connection = channels_per_connection;
        self
    }

    /// Finalise the builder and get an instance of [`ChannelPool`].
    pub fn build(self) -> Result<ChannelPool, Error> {
        if self.channels_per_connection == 0 {
            return Err(Error::InvalidSize);
        }
        Ok(ChannelPool {
            inner: Arc::new(PoolInner {
                connector: self.connector,
                channels_per_connection: self.channels_per_connection,
                closed: AtomicBool::new(false),
                entries: RwLock::new(Vec::new()),
            }),
        })
    }
}
