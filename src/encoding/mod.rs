//! Pure helpers behind prescription creation and display
//!
//! - `code`: short random prescription codes
//! - `qr`: the compact medication summary embedded in QR symbols
//! - `date`: long-form display dates

pub mod code;
pub mod date;
pub mod qr;
