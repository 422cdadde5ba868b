//! HTTP handlers

pub mod health;
pub mod intro;
pub mod predict;

#[cfg(test)]
mod tests;
