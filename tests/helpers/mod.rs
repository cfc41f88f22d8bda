//! Shared fixtures and assertions for compile tests.

#![allow(dead_code)]

pub mod template_assertions;
