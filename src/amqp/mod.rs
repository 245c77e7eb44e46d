//! Helpers for connecting to a rabbitmq broker

mod broker;
pub mod configuration;
mod factory;

pub use broker::{connector_fn, BrokerChannel, BrokerConnection, Connector, ConnectorFn};
pub use factory::{AmqpConnector, LapinChannel, LapinConnection};

pub use lapin::{options, types, BasicProperties, ExchangeKind};
