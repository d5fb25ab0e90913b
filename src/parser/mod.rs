//! Message reading: `.eml` files, header unfolding, and date parsing.

pub mod date;
pub mod eml;
pub mod header;
