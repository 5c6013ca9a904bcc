pub mod constants;
pub mod validation;
pub mod rate_limit;
pub mod spin_wheel;
pub mod campaign;
pub mod marketplace;
pub mod pool;
