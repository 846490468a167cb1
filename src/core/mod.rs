#![forbid(unsafe_code)]

pub mod filter;
pub mod project;
pub mod slug;
pub mod tree;
