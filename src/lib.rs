//! dlgate - download preference gate for fastdl hosts
//!
//! Sits in front of a static download host and decides, per request, whether
//! a game client may fetch a file, based on per-account category preferences
//! in a small relational store. It exposes all modules for testing purposes.

pub mod entities;
pub mod errors;
pub mod gate;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod web;
