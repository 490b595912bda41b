//! Merge scoring with a combo window

use crate::settings::MergeScoring;

#[derive(Debug, Clone)]
pub struct MergeScore {
    tuning: MergeScoring,
    score: u64,
    combo: u32,
    last_merge_at: f32,
}

impl MergeScore {
    pub fn new(tuning: MergeScoring) -> Self {
        Self {
            tuning,
            score: 0,
            combo: 1,
            last_merge_at: f32::NEG_INFINITY,
        }
    }

    pub fn total(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Base points for producing a ball of `level`
    pub fn points_for_level(&self, level: usize) -> u64 {
        let table = &self.tuning.points_by_level;
        if !table.is_empty() {
            let idx = level.saturating_sub(1).min(table.len() - 1);
            return table[idx];
        }
        let exp = u32::try_from(level.saturating_sub(1)).unwrap_or(u32::MAX);
        2u64.saturating_pow(exp).saturating_mul(10)
    }

    /// Score a merge at time `now`; returns the points awarded
    pub fn on_merged(&mut self, level: usize, now: f32) -> u64 {
        if now - self.last_merge_at <= self.tuning.combo_window {
            self.combo = (self.combo + 1).min(self.tuning.max_combo.max(1));
        } else {
            self.combo = 1;
        }
        self.last_merge_at = now;

        let points = self.points_for_level(level) * self.combo as u64;
        self.score += points;
        points
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.combo = 1;
        self.last_merge_at = f32::NEG_INFINITY;
    }
}
