//! Process-wide chip ledger: `(room_id, player_name) -> chips`, restoring a
//! returning player's balance across reconnects for the life of the process.

use std::collections::HashMap;
use std::sync::Mutex;

use poker_core::INITIAL_CHIPS;

#[derive(Default)]
pub struct ChipLedger {
    balances: Mutex<HashMap<(String, String), u32>>,
}

impl ChipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance for a returning player, or `INITIAL_CHIPS` if never seen.
    pub fn restore(&self, room_id: &str, name: &str) -> u32 {
        let balances = self.balances.lock().expect("chip ledger poisoned");
        balances
            .get(&(room_id.to_string(), name.to_string()))
            .copied()
            .unwrap_or(INITIAL_CHIPS)
    }

    pub fn save(&self, room_id: &str, name: &str, chips: u32) {
        let mut balances = self.balances.lock().expect("chip ledger poisoned");
        balances.insert((room_id.to_string(), name.to_string()), chips);
    }
}
