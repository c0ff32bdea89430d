//! Stillpoint - Guided Meditation Companion
//!
//! This crate implements a turn-bounded conversation collector that interviews
//! users about their current state and generates personalised meditation
//! scripts through conversational AI.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
