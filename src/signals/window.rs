//! Per-ticker window of recently fired atoms

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// Recently fired atoms, keyed by ticker.
///
/// Each ticker holds at most one entry per atom id (a new firing replaces the
/// old timestamp). Entries live for `ttl` after they fired and a ticker never
/// holds more than `max_entries` atoms; the oldest firing is evicted first.
#[derive(Debug, Clone)]
pub struct ActiveAtomWindow {
    ttl: chrono::Duration,
    max_entries: usize,
    tickers: HashMap<String, HashMap<String, DateTime<Utc>>>,
}

impl ActiveAtomWindow {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500)),
            max_entries: max_entries.max(1),
            tickers: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Record atoms fired for `ticker` at `fired_at`.
    pub fn record<I, S>(&mut self, ticker: &str, atom_ids: I, fired_at: DateTime<Utc>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = self.tickers.entry(ticker.to_string()).or_default();
        for atom_id in atom_ids {
            entries.insert(atom_id.as_ref().to_string(), fired_at);
        }

        while entries.len() > self.max_entries {
            let oldest = entries
                .iter()
                .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    entries.remove(&id);
                }
                None => break,
            }
        }

        if entries.is_empty() {
            self.tickers.remove(ticker);
        }
    }

    /// Drop entries for `ticker` whose lifetime ended at or before `now`.
    /// Returns how many were dropped.
    pub fn expire(&mut self, ticker: &str, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let Some(entries) = self.tickers.get_mut(ticker) else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, fired_at| match fired_at.checked_add_signed(ttl) {
            Some(expires_at) => expires_at > now,
            None => true,
        });
        let dropped = before - entries.len();
        if entries.is_empty() {
            self.tickers.remove(ticker);
        }
        dropped
    }

    /// [`expire`](Self::expire) every ticker at once
    pub fn expire_all(&mut self, now: DateTime<Utc>) -> usize {
        let tickers: Vec<String> = self.tickers.keys().cloned().collect();
        tickers.iter().map(|t| self.expire(t, now)).sum()
    }

    /// Atom ids currently active for `ticker`
    pub fn atoms(&self, ticker: &str) -> BTreeSet<String> {
        self.tickers
            .get(ticker)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// `(atom_id, fired_at)` pairs for `ticker`, sorted by atom id
    pub fn entries(&self, ticker: &str) -> Vec<(String, DateTime<Utc>)> {
        let mut entries: Vec<_> = self
            .tickers
            .get(ticker)
            .map(|e| e.iter().map(|(id, at)| (id.clone(), *at)).collect())
            .unwrap_or_default();
        entries.sort();
        entries
    }

    pub fn contains(&self, ticker: &str, atom_id: &str) -> bool {
        self.tickers
            .get(ticker)
            .is_some_and(|entries| entries.contains_key(atom_id))
    }

    pub fn clear(&mut self, ticker: &str) {
        self.tickers.remove(ticker);
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.tickers.keys().map(String::as_str)
    }
}
