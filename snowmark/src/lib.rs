//! Expose snowmark's internal API for use in testing. It is not meant to be
//! used as a library; use `snowmark-render` for that.
pub mod cli;
pub mod render;
