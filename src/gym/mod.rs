pub mod taxi;

pub use taxi::{Taxi, TaxiAction};
