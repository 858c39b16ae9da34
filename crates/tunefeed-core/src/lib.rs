pub mod config;
pub mod logging;

pub mod control;
pub mod engine;
pub mod feeder;
pub mod locator;
pub mod session;

#[cfg(test)]
pub(crate) mod test_util;
