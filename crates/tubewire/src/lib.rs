//! Client for Beanstalkd-style work-queue servers.
//!
//! `tubewire` speaks the line-oriented queue protocol over TCP. Each
//! [`Connection`] owns one [`Transport`] and tracks the server-side tube
//! context: the tube new jobs are stored in and the set of tubes reservations
//! draw from. Commands are dispatched against a *desired* context; the
//! connection first issues the `use`, `watch` and `ignore` commands needed to
//! align the server with it, then sends the command and interprets the reply
//! into a typed [`Response`] or a [`ClientError`].
//!
//! A [`Pool`] spreads commands across several servers, keeping one logical
//! context and reconciling each member lazily when it is picked. The
//! [`Tube`] and [`Manager`] facades wrap any [`Dispatcher`] with
//! job-oriented operations.
//!
//! # Example
//!
//! ```rust,no_run
//! use tubewire::{Connection, PutOptions, TcpConnector, Tube};
//!
//! let endpoint = "localhost:11300".parse().expect("valid endpoint");
//! let connection = Connection::open(endpoint, TcpConnector::new()).expect("connect");
//! let shared = tubewire::SharedConnection::from(connection);
//! let tube = Tube::named("emails", &shared).expect("valid tube");
//! let id = tube.put(b"hello".to_vec(), PutOptions::default()).expect("put");
//! println!("stored job {id}");
//! ```

pub mod body;
pub mod command;
pub mod connection;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod manager;
pub mod name;
pub mod pool;
pub mod response;
pub mod transport;
pub mod tube;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use self::body::{BodyDecoder, RawDecoder, YamlListDecoder, YamlMapDecoder};
pub use self::command::{
    Command, CommandName, DEFAULT_PRIORITY, DEFAULT_TTR, PutOptions, Reply, check_universal,
};
pub use self::connection::{Connection, DispatchStage, SharedConnection};
pub use self::context::{ContextFacet, ContextOp, TubeContext};
pub use self::dispatcher::Dispatcher;
pub use self::error::{
    BodyError, ClientError, ContextError, NameError, ProtocolError, ProtocolErrorKind,
    TransportError,
};
pub use self::job::{Job, JobState};
pub use self::manager::Manager;
pub use self::name::{DEFAULT_TUBE_NAME, MAX_NAME_LENGTH, TubeName, ensure_valid_name};
pub use self::pool::{Pool, RandomSelector, RoundRobinSelector, Selector};
pub use self::response::{Payload, Response, Scalar, StatValue, Status};
pub use self::transport::{Connector, MAX_LINE_BYTES, TcpConnector, Transport};
pub use self::tube::Tube;
pub use tubewire_config::ServerEndpoint;
