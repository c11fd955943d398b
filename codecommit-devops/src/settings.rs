// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{DEFAULT_LOG_STREAM, HANDLER_ENV, LOG_LEVEL_ENV, LOG_STREAM_ENV};
use crate::{Error, Result};
use log::LevelFilter;

/// Per execution environment configuration, read once at cold start.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub handler: Option<String>,
    pub log_stream_name: String,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup(LOG_LEVEL_ENV)
            .and_then(|level| level.trim().parse().ok())
            .unwrap_or(LevelFilter::Info);

        Settings {
            handler: lookup(HANDLER_ENV).filter(|h| !h.trim().is_empty()),
            log_stream_name: lookup(LOG_STREAM_ENV)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_STREAM.to_string()),
            log_level,
        }
    }

    pub fn handler(&self) -> Result<&str> {
        self.handler
            .as_deref()
            .ok_or_else(|| Error::Configuration(format!("{HANDLER_ENV} is not set")))
    }
}
