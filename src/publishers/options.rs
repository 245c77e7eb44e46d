use deadpool::managed::{self, Manager, Object, Pool, Timeouts};
use lapin::options::BasicPublishOptions;
use lapin::BasicProperties;
use std::convert::Infallible;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// Delivery mode of a published message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// The broker may drop the message on restart.
    Transient = 1,
    /// The broker writes the message to disk.
    #[default]
    Persistent = 2,
}

/// The properties template applied to every published message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publishing {
    pub delivery_mode: DeliveryMode,
    pub content_type: String,
}

impl Default for Publishing {
    fn default() -> Self {
        Self {
            delivery_mode: DeliveryMode::Persistent,
            content_type: "application/json".into(),
        }
    }
}

impl Publishing {
    pub(crate) fn properties(&self) -> BasicProperties {
        BasicProperties::default()
            .with_delivery_mode(self.delivery_mode as u8)
            .with_content_type(self.content_type.as_str().into())
    }
}

/// Per-call publishing options.
///
/// Instances are borrowed from a pool owned by the [`Publisher`](super::Publisher), customised
/// through [`PublishOption`]s for the duration of a single publish and reset before going back
/// to the pool.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublisherOptions {
    /// Exchange used when publishing to a queue. Empty means the default exchange.
    pub exchange: String,
    /// Ask the broker to return the message if it cannot be routed to any queue.
    pub mandatory: bool,
    pub immediate: bool,
    /// `None` falls back to [`Publishing::default`].
    pub publishing: Option<Publishing>,
}

impl PublisherOptions {
    /// Restore the zero value, keeping the allocation of `exchange` around for the next borrower.
    pub(crate) fn reset(&mut self) {
        self.exchange.clear();
        self.mandatory = false;
        self.immediate = false;
        self.publishing = None;
    }

    pub(crate) fn basic_publish_options(&self) -> BasicPublishOptions {
        BasicPublishOptions {
            mandatory: self.mandatory,
            immediate: self.immediate,
        }
    }

    pub(crate) fn properties(&self) -> BasicProperties {
        match &self.publishing {
            Some(publishing) => publishing.properties(),
            None => Publishing::default().properties(),
        }
    }
}

/// A single customisation of [`PublisherOptions`].
///
/// Build them with [`with_exchange`], [`with_mandatory`], [`with_immediate`] and [`with_publishing`].
/// Fields that are not customised keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOption {
    Exchange(String),
    Mandatory(bool),
    Immediate(bool),
    Publishing(Publishing),
}

impl PublishOption {
    pub(crate) fn apply(&self, options: &mut PublisherOptions) {
        match self {
            Self::Exchange(exchange) => {
                options.exchange.clear();
                options.exchange.push_str(exchange);
            }
            Self::Mandatory(mandatory) => options.mandatory = *mandatory,
            Self::Immediate(immediate) => options.immediate = *immediate,
            Self::Publishing(publishing) => options.publishing = Some(publishing.clone()),
        }
    }
}

/// Publish through `exchange` instead of the default exchange.
pub fn with_exchange(exchange: impl Into<String>) -> PublishOption {
    PublishOption::Exchange(exchange.into())
}

pub fn with_mandatory(mandatory: bool) -> PublishOption {
    PublishOption::Mandatory(mandatory)
}

/// The immediate flag was dropped in RabbitMQ 3.0: setting it makes the broker close the channel.
pub fn with_immediate(immediate: bool) -> PublishOption {
    PublishOption::Immediate(immediate)
}

/// Override the delivery mode and content type of the published message.
pub fn with_publishing(publishing: Publishing) -> PublishOption {
    PublishOption::Publishing(publishing)
}

/// Hands out zeroed [`PublisherOptions`] instances.
pub(crate) struct OptionsManager;

#[async_trait::async_trait]
impl Manager for OptionsManager {
    type Type = PublisherOptions;
    type Error = Infallible;

    async fn create(&self) -> Result<PublisherOptions, Infallible> {
        Ok(PublisherOptions::default())
    }

    async fn recycle(&self, _options: &mut PublisherOptions) -> managed::RecycleResult<Infallible> {
        Ok(())
    }
}

/// Reusable [`PublisherOptions`] objects.
///
/// Borrowing never waits: when every pooled instance is in use, a detached one is handed out
/// and dropped after use.
pub(crate) struct OptionsPool {
    pool: Pool<OptionsManager>,
}

impl OptionsPool {
    pub(crate) fn new(max_size: usize) -> Result<Self, anyhow::Error> {
        let pool = Pool::builder(OptionsManager).max_size(max_size).build()?;
        Ok(Self { pool })
    }

    pub(crate) async fn borrow(&self) -> BorrowedOptions {
        let timeouts = Timeouts {
            wait: Some(Duration::ZERO),
            ..Timeouts::default()
        };
        let lease = match self.pool.timeout_get(&timeouts).await {
            Ok(object) => Lease::Pooled(object),
            Err(_) => Lease::Detached(PublisherOptions::default()),
        };
        BorrowedOptions { lease }
    }
}

enum Lease {
    Pooled(Object<OptionsManager>),
    Detached(PublisherOptions),
}

/// A borrowed [`PublisherOptions`], reset as soon as it goes out of scope.
pub(crate) struct BorrowedOptions {
    lease: Lease,
}

impl Deref for BorrowedOptions {
    type Target = PublisherOptions;

    fn deref(&self) -> &PublisherOptions {
        match &self.lease {
            Lease::Pooled(object) => object,
            Lease::Detached(options) => options,
        }
    }
}

impl DerefMut for BorrowedOptions {
    fn deref_mut(&mut self) -> &mut PublisherOptions {
        match &mut self.lease {
            Lease::Pooled(object) => object,
            Lease::Detached(options) => options,
        }
    }
}

impl Drop for BorrowedOptions {
    fn drop(&mut self) {
        // Runs before the lease field is dropped, i.e. before the object goes back to the pool.
        self.reset();
    }
}
