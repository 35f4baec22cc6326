pub mod connection;

pub use connection::{ConnectTarget, Connection};
