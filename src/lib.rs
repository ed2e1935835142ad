//! TechEdge storefront API: user registration and login plus read/write
//! access to the flash-sale, product and reverie collections.

pub mod app;
pub mod auth;
pub mod catalogue;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod reverie;
pub mod state;
pub mod storage;
