//! CLI module containing argument parsing and listings

pub mod args;
pub mod display;

#[cfg(test)]
mod tests;
