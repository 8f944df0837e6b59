//! Gallery - an online exhibition gallery
//!
//! Visitors browse exhibitions and pieces, comment on pieces, sign
//! exhibition guestbooks, and like or share both. This library holds the
//! configuration, persistence, interaction ledger, templates and HTTP layer.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
