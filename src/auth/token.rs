use rand::{distributions::Alphanumeric, Rng};

/// Mint an opaque bearer secret. The secret is the whole credential; it is
/// stored server-side and looked up verbatim on each request.
pub fn mint_secret(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_has_requested_length() {
        assert_eq!(mint_secret(48).len(), 48);
        assert_eq!(mint_secret(1).len(), 1);
    }

    #[test]
    fn secret_is_alphanumeric() {
        let secret = mint_secret(64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn two_secrets_differ() {
        assert_ne!(mint_secret(48), mint_secret(48));
    }
}
