pub mod model;

pub use model::{Amount, Transaction};
