pub mod bond;
pub mod credit;
pub mod market;
