pub mod classifier;
pub mod config;
pub mod document;
pub mod parser;
pub mod server;
pub mod session;

#[cfg(test)]
mod tests;
