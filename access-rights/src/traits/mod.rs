// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces for objects owning a rights record.
mod protected;

pub use protected::ProtectedResource;
