use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Length of the random part of a secret, after the `pk_<env>_` prefix.
pub const SECRET_BODY_LEN: usize = 40;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Source of ids and secrets for new keys.
///
/// Ids must never repeat for the lifetime of a generator.
pub trait KeyGenerator: Send + Sync {
    /// A fresh id of the form `key-<token>`.
    fn next_id(&self) -> String;

    /// A fresh secret of the form `pk_(live|test)_<40 alphanumerics>`.
    fn next_secret(&self) -> String;
}

/// Build a secret from any rng: environment tag first, then the body.
fn secret_from_rng<R: Rng>(rng: &mut R) -> String {
    let env = if rng.gen_bool(0.5) { "live" } else { "test" };
    let body: String = (0..SECRET_BODY_LEN)
        .map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char)
        .collect();
    format!("pk_{env}_{body}")
}

/// Clock-based ids and thread-local randomness.
///
/// Ids are the current Unix time in milliseconds, bumped forward when two
/// calls land in the same millisecond.
#[derive(Default)]
pub struct RandomKeyGenerator {
    last_token: AtomicU64,
}

impl RandomKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyGenerator for RandomKeyGenerator {
    fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let prev = self
            .last_token
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        let token = now.max(prev + 1);
        format!("key-{token}")
    }

    fn next_secret(&self) -> String {
        secret_from_rng(&mut rand::thread_rng())
    }
}

/// Deterministic generator for tests and reproducible sessions.
pub struct SeededKeyGenerator {
    rng: Mutex<StdRng>,
    next_token: AtomicU64,
}

impl SeededKeyGenerator {
    /// First token handed out; ids look like clock-based ones.
    pub const FIRST_TOKEN: u64 = 1_700_000_000_000;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            next_token: AtomicU64::new(Self::FIRST_TOKEN),
        }
    }
}

impl KeyGenerator for SeededKeyGenerator {
    fn next_id(&self) -> String {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        format!("key-{token}")
    }

    fn next_secret(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        secret_from_rng(&mut *rng)
    }
}
