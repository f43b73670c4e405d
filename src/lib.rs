//! InfoMed QR: medicine info records published through QR-coded view links,
//! with best-effort translation of record text.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod providers;
pub mod qr;
pub mod records;
pub mod routes;
pub mod server;
pub mod translation;
