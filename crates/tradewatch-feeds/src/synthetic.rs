//! Synthetic source: a randomized stand-in for the bot's event stream.
//!
//! The generator is owned by the feed controller; the timer task only sends
//! ticks, so the RNG state survives pause/resume and a fixed seed yields the
//! same sequence every run.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tradewatch_core::{LogEvent, LogType};

/// Draw pool for event types. Trades appear twice so they make up 40% of the
/// feed; errors are never synthesized.
pub const TYPE_POOL: [LogType; 5] = [
    LogType::Info,
    LogType::Success,
    LogType::Trade,
    LogType::Trade,
    LogType::Warning,
];

const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub struct SyntheticGenerator {
    rng: StdRng,
    accounts: Vec<String>,
}

impl SyntheticGenerator {
    /// `seed = None` draws from OS entropy.
    pub fn new(accounts: Vec<String>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, accounts }
    }

    /// Manufacture the next event, stamped `now`.
    pub fn next_event(&mut self, now: DateTime<Utc>) -> LogEvent {
        let kind = TYPE_POOL[self.rng.gen_range(0..TYPE_POOL.len())];
        let account = if self.accounts.is_empty() {
            crate::decode::DEFAULT_ACCOUNT.to_string()
        } else {
            self.accounts[self.rng.gen_range(0..self.accounts.len())].clone()
        };

        let (message, amount) = match kind {
            LogType::Trade => {
                let profit: u32 = self.rng.gen_range(100..5_100);
                (
                    format!("Sold player Mbappe for {} coins.", profit * 10),
                    Some(format!("+{profit}")),
                )
            }
            LogType::Success => ("Successfully listed items on transfer market.".to_string(), None),
            LogType::Warning => (
                "Response time high (240ms). Retrying connection...".to_string(),
                None,
            ),
            LogType::Info | LogType::Error => {
                ("Scanning market for undervalue items...".to_string(), None)
            }
        };

        LogEvent {
            id: self.next_id(),
            timestamp: now,
            kind,
            account,
            message,
            amount,
        }
    }

    fn next_id(&mut self) -> String {
        (0..ID_LEN)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}
