use crate::error::ConfigError;
use crate::token::{Alphabet, Token};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::num::NonZeroUsize;
use xxhash_rust::xxh64::xxh64;

/// Token length used when none is configured.
pub const DEFAULT_TOKEN_LENGTH: usize = 6;

/// Derives tokens from destination URLs and cleans up user-supplied aliases.
///
/// Generation is content-addressed: the same seed always yields the same
/// token for a given alphabet and length. The seed string is hashed with
/// `xxh64` (seed `0`) and the hash seeds a [`StdRng`]; each token character
/// is then sampled uniformly and independently from the alphabet. Both are
/// platform independent, so tokens are stable across processes and hosts.
/// `StdRng` may change algorithm between `rand` minor versions, which would
/// change every generated token; the workspace pins `rand` 0.8.
///
/// Distinct seeds can collide on the same token. No uniqueness is enforced
/// here; callers decide what a collision means.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    alphabet: Alphabet,
    length: NonZeroUsize,
}

impl TokenCodec {
    pub fn new(alphabet: Alphabet, length: usize) -> Result<Self, ConfigError> {
        let length = NonZeroUsize::new(length).ok_or(ConfigError::ZeroTokenLength)?;
        Ok(Self { alphabet, length })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn length(&self) -> usize {
        self.length.get()
    }

    /// Generates a token deterministically from `seed`.
    pub fn generate(&self, seed: &str) -> Token {
        let mut rng = StdRng::seed_from_u64(xxh64(seed.as_bytes(), 0));
        let chars = self.alphabet.as_chars();

        let token: String = (0..self.length.get())
            .map(|_| chars[rng.gen_range(0..chars.len())])
            .collect();

        Token::new_unchecked(token)
    }

    /// Removes every character of `alias` that is not in the alphabet.
    ///
    /// Returns `None` if nothing is left. The result is not length-bounded.
    pub fn sanitize(&self, alias: &str) -> Option<Token> {
        let cleaned: String = alias
            .chars()
            .filter(|c| self.alphabet.contains(*c))
            .collect();

        if cleaned.is_empty() {
            None
        } else {
            Some(Token::new_unchecked(cleaned))
        }
    }

    /// Picks the token for a new link.
    ///
    /// A usable alias wins; an absent alias, or one with no admissible
    /// characters, falls back to [`TokenCodec::generate`] over `seed`.
    pub fn resolve(&self, alias: Option<&str>, seed: &str) -> Token {
        alias
            .and_then(|alias| self.sanitize(alias))
            .unwrap_or_else(|| self.generate(seed))
    }
}
