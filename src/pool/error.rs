/// Pool error.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The broker could not be reached when dialing a new connection.
    #[error("Failed to dial a new connection to the RabbitMq broker")]
    Dial(#[source] anyhow::Error),
    /// A logical channel could not be opened on an existing connection.
    #[error("Failed to open a channel on a RabbitMq connection")]
    ChannelOpen(#[source] anyhow::Error),
    /// [`ChannelPool::close`](super::ChannelPool::close) was called more than once.
    #[error("The channel pool is already closed")]
    AlreadyClosed,
    /// A channel was requested after the pool was closed.
    #[error("The channel pool has been closed, no further channels can be opened")]
    Closed,
    #[error("A channel pool must allow at least one channel per connection")]
    InvalidSize,
    #[error("Invalid RabbitMq url")]
    InvalidUri(#[source] anyhow::Error),
}
