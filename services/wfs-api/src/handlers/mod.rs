//! HTTP request handlers for the WFS API.

pub mod common;
pub mod health;
pub mod wfs;
