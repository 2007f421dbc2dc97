// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Ibex - Extern function registry
//!
//! The host-language side of `extern` declarations: table sources
//! like `read_csv`, sinks like `write_parquet`, and
//! scalar helpers, registered by name and dispatched by
//! `ExternCall` nodes at interpret time.

mod error;
mod registry;
mod value;

pub use error::ExternError;
pub use registry::{ExternFn, ExternRead, ExternRegistry};
pub use value::ScalarValue;
