//! Seed-user generation
//!
//! Produces the `name:email:password` rows imported into the exchange's user
//! table before any login can happen. Output is reproducible for a given seed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha512};
use thiserror::Error;
use types::credential::SeedUser;

pub const DEFAULT_SEED_USERS: usize = 10_000;
pub const MAX_NAME_LEN: usize = 10;
/// Highest count the five-digit email numbering can address
pub const MAX_SEED_USERS: usize = 99_999;

const FIRST_NAMES: [&str; 20] = [
    "John", "Jane", "Mike", "Sara", "Dave", "Lisa", "Rob", "Amy", "Jim", "Jess", "Will", "Ash", "Rick", "Ann",
    "Tom", "Kim", "Chris", "Kate", "Alex", "Sam",
];

const LAST_NAMES: [&str; 20] = [
    "Kim", "Lee", "Park", "Choi", "Jung", "Kang", "Cho", "Yoon", "Jang", "Lim", "Han", "Oh", "Seo", "Shin",
    "Kwon", "Hwang", "Ahn", "Song", "Jeon", "Ko",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("user count must be between 1 and {max}, got {count}")]
    InvalidCount { count: usize, max: usize },

    #[error("plain password must not be empty")]
    EmptyPassword,
}

/// Base64 (standard alphabet, padded) of the SHA-512 digest of `plain`
pub fn hash_password(plain: &str) -> String {
    let digest = Sha512::digest(plain.as_bytes());
    STANDARD.encode(digest)
}

/// Sequential account email for 1-based index `i`
pub fn seed_email(i: usize) -> String {
    format!("user{:05}@example.com", i)
}

/// Random `"<First> <Last>"`, redrawn until it fits in `MAX_NAME_LEN` characters.
fn random_name(rng: &mut ChaCha8Rng) -> String {
    loop {
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("John");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("Kim");
        let name = format!("{} {}", first, last);
        if name.len() <= MAX_NAME_LEN {
            return name;
        }
    }
}

/// Generate `count` seed users sharing one hashed password.
pub fn generate_seed_users(count: usize, plain_password: &str, seed: u64) -> Result<Vec<SeedUser>, SeedError> {
    if count == 0 || count > MAX_SEED_USERS {
        return Err(SeedError::InvalidCount {
            count,
            max: MAX_SEED_USERS,
        });
    }
    if plain_password.is_empty() {
        return Err(SeedError::EmptyPassword);
    }

    let password = hash_password(plain_password);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    Ok((1..=count)
        .map(|i| SeedUser {
            name: random_name(&mut rng),
            email: seed_email(i),
            password: password.clone(),
        })
        .collect())
}
