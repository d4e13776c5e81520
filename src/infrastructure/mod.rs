pub mod persistence;
pub mod web;
