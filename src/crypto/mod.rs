pub mod base58;
pub mod operator;
pub mod traits;
