// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

mod aggregate;
mod distinct;
mod extern_call;
mod filter;
mod join;
mod order;
mod project;
mod update;
mod util;

pub use aggregate::aggregate;
pub use distinct::distinct;
pub use extern_call::{extern_call, ExternCallResult};
pub use filter::filter;
pub use join::join;
pub use order::order;
pub use project::project;
pub use update::{update, update_grouped};
