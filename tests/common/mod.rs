#![allow(dead_code)]

pub mod app;
pub mod factory;

pub use app::{location, messages, session_cookie, TestApp, TestSession};
pub use factory::{test_photo, Factory, Fixtures, TEST_PASSWORD};
