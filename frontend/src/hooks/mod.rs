pub mod auth;
pub mod use_tiv_balance;

pub use auth::*;
pub use use_tiv_balance::*;
