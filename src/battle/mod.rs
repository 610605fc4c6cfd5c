pub mod abilities;
pub mod ai;
pub mod calculators;
pub mod commands;
pub mod engine;
pub mod fairness;
pub mod state;

#[cfg(test)]
mod tests;
