pub mod codec;
pub mod driver;
pub mod error;
pub mod harness;
pub mod script;
pub mod session;
pub mod transaction;
