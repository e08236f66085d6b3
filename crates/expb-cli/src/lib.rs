//! Library side of the `expb` command-line tool.

pub mod check;
pub mod logging;
