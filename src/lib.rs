// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budget;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod notifications;
pub mod stats;
pub mod store;
pub mod tracker;
pub mod utils;

pub use error::{CoreError, Result, StoreError, ValidationError};
