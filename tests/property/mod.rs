// Copyright 2025 Cowboy AI, LLC.

pub mod chain_integrity;
pub mod client_assignment;
