pub mod indicators;
pub mod provider;
pub mod yahoo;
