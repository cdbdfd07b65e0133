//! HTTP surface of the prescription service.

pub mod rest;
