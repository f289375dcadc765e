use rand::{distributions::Alphanumeric, Rng};

pub const IDEMPOTENCY_KEY_PREFIX: &str = "idemp_";
pub const API_KEY_PREFIX: &str = "pk_";
pub const SECRET_KEY_PREFIX: &str = "sk_";

/// Random `[A-Za-z0-9]` string of `length` characters.
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn generate_id() -> String {
    generate_random_string(16)
}

pub fn generate_idempotency_key() -> String {
    format!("{}{}", IDEMPOTENCY_KEY_PREFIX, generate_random_string(32))
}

pub fn generate_api_key() -> String {
    format!("{}{}", API_KEY_PREFIX, generate_random_string(32))
}

pub fn generate_secret_key() -> String {
    format!("{}{}", SECRET_KEY_PREFIX, generate_random_string(64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        assert_eq!(generate_id().len(), 16);

        let key = generate_idempotency_key();
        assert!(key.starts_with("idemp_"));
        assert_eq!(key.len(), 6 + 32);

        assert_eq!(generate_api_key().len(), 3 + 32);
        assert_eq!(generate_secret_key().len(), 3 + 64);
        assert!(generate_random_string(40).chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_ids_differ() {
        assert_ne!(generate_id(), generate_id());
    }
}
