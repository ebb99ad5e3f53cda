//! Random identifier generation
//!
//! Locally-unique short ids for comments, posts and pending transactions.
//! 9 base36 characters give 36^9 ≈ 10^14 combinations, so collisions
//! within a single post's comment list are negligible.

use rand::Rng;

const ID_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SHORT_ID_LEN: usize = 9;

/// Generate a random base36 id of the given length
pub fn random_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// Short id used for posts, comments and pending transactions
pub fn short_id() -> String {
    random_id(SHORT_ID_LEN)
}
