#[macro_use] extern crate log;

pub mod mw;
pub mod plug;
pub mod request;
pub mod result;
pub mod server;
pub mod util;

pub use plug::{Conn, Pipeline, Plug};
pub use request::OwnedRequest;
pub use server::Server;
