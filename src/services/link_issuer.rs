// src/services/link_issuer.rs

use std::sync::LazyLock;

use rand::{Rng, distributions::Alphanumeric};
use regex::Regex;

use crate::config::DEFAULT_LINK_LENGTH;

/// Upper bound on re-draws when the store reports a collision.
pub const MAX_LINK_DRAWS: usize = 16;

static LINK_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{8,32}$").expect("static regex"));

/// Draws opaque alphanumeric tokens used as the public identifier of a quiz.
/// 62 symbols per character, so the default length carries ~71 bits.
#[derive(Debug, Clone, Copy)]
pub struct LinkIssuer {
    length: usize,
}

impl Default for LinkIssuer {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_LENGTH)
    }
}

impl LinkIssuer {
    pub fn new(length: usize) -> Self {
        Self { length: length.clamp(8, 32) }
    }

    pub fn issue(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }

    /// Cheap shape check so garbage never reaches the store.
    pub fn is_well_formed(link: &str) -> bool {
        LINK_SHAPE.is_match(link)
    }
}
