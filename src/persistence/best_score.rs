use super::store::ScoreStore;

const KEY_PREFIX: &str = "snake_best_";

/// The best score of one board, backed by a [`ScoreStore`].
///
/// The store is read when the value is created or refreshed and whenever a
/// new score is recorded. Everything else reads the cached value.
///
/// Store failures never reach the game: a failed read counts as 0 and a
/// failed write is dropped, both with a warning in the log.
#[derive(Debug)]
pub struct BestScore<S> {
    store: S,
    key: String,
    value: u32,
}

impl<S: ScoreStore> BestScore<S> {
    pub fn new(store: S, board_id: &str) -> Self {
        let mut best = Self {
            store,
            key: format!("{KEY_PREFIX}{board_id}"),
            value: 0,
        };
        best.refresh();
        best
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last value read from or written to the store
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Re-read the stored best, e.g. at the start of a game
    pub fn refresh(&mut self) -> u32 {
        self.value = self.read_stored();
        self.value
    }

    /// Store `score` if it beats the stored best. Returns true if it was written.
    pub fn record(&mut self, score: u32) -> bool {
        let best = self.refresh();
        if score <= best {
            return false;
        }

        match self.store.set(&self.key, score) {
            Ok(()) => {
                tracing::info!(key = %self.key, previous = best, score, "new best score");
                self.value = score;
                true
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "could not save best score");
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    fn read_stored(&self) -> u32 {
        match self.store.get(&self.key) {
            Ok(value) => value.unwrap_or(0),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "could not read best score, using 0");
                0
            }
        }
    }
}
