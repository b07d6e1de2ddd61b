//! Request and response bodies

pub mod bills;
