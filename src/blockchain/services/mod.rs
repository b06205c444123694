pub mod account;
pub mod blocks;
pub mod home;
pub mod search;
pub mod transactions;
