// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod fetch_controller;
pub mod identity;
pub mod identity_pool;
pub mod payload_parser;
pub mod reqwest_engine;
pub mod traits;
