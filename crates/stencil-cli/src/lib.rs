//! Stencil CLI library — command implementations shared by the `stencil`
//! binary and its integration tests.

pub mod commands;
