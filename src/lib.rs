// execdemo/src/lib.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Client for the `/exec` demo backend plus the UI packaging tool.
//!
//! A [`command::Command`] is encoded as a form body, posted by a
//! [`submitter::CommandSubmitter`], and the outcome lands in a
//! [`result::ResultSlot`] as a [`result::ExecResult`].

pub mod command;
pub mod config;
pub mod error;
pub mod form;
pub mod log;
pub mod package;
pub mod render;
pub mod result;
pub mod submitter;
