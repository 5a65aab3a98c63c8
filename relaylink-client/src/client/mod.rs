mod client;
mod client_command;
mod dispatcher;

pub use client::Client;
pub(crate) use client_command::ClientCommand;
pub(crate) use dispatcher::Dispatcher;
