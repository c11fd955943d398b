// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod approval_rule;
pub mod codecommit;
pub mod constants;
pub mod custom_resource;
pub mod errors;
pub mod pr_build;
pub mod settings;
mod utils;

pub use errors::Error;

pub type Result<R> = std::result::Result<R, Error>;
