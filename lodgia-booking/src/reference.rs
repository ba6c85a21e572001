use rand::Rng;

/// Booking references look like `REF-7Q2M01XZ`: the prefix plus eight
/// characters drawn uniformly from `[A-Z0-9]`. The 36^8 space makes
/// collisions rare but not impossible; the admission coordinator retries
/// against the store's unique constraint.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 8;

pub const PREFIX: &str = "REF-";

pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    format!("{}{}", PREFIX, suffix)
}
