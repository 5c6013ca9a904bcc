pub mod spin_wheel;
pub mod campaigns;
pub mod quiz;
pub mod marketplace;
pub mod pools;
