pub mod client;
pub mod health;
pub mod serve;
