//! Student marks register.
//!
//! Records students with their per-subject marks, derives letter grades and
//! grade points from subject totals, and aggregates them into a CGPA.

pub mod admission;
pub mod api;
pub mod config;
pub mod db;
pub mod grading;
pub mod models;
