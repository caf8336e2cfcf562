//! Villo bike-share availability server.
//!
//! Fetches real-time station availability from the Brussels open-data
//! feed, reconciles the upstream schema variants into canonical station
//! records, and serves them (plus a raw CORS-friendly proxy of the
//! upstream payload) to the web front-end.

pub mod cache;
pub mod domain;
pub mod opendata;
pub mod web;
