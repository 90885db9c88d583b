use std::{fmt::Display, time::Duration};

use thiserror::Error;

/// The single failure kind a search dispatch can end in.
///
/// Every variant is absorbed by the coalescer; none of them reach the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("search transport failed: {0}")]
    Transport(String),
    #[error("search endpoint answered with status {0}")]
    Status(u16),
    #[error("search did not complete within {0:?}")]
    TimedOut(Duration),
}

impl FetchError {
    pub fn transport(err: impl Display) -> Self {
        Self::Transport(err.to_string())
    }
}
