pub mod collection;
pub mod config;
pub mod error;
pub mod message;
pub mod responder;
pub mod session;

#[cfg(test)]
mod tests;
