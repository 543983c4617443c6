use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Random alphanumeric token used as the applicant's self-service key.
pub fn generate_access_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
