//! `emlrename` — rename a folder of stored e-mail messages into sortable names.
//!
//! Each `.eml` file is renamed to `"{date} [{subject}] fm {from} to {to}.eml"`,
//! with every part normalized into a short, filesystem-safe token.

pub mod config;
pub mod error;
pub mod folder;
pub mod model;
pub mod naming;
pub mod normalize;
pub mod parser;
