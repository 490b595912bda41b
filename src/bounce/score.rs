//! Bounce game scoring
//!
//! Every paddle bounce is worth a point, pickups add more. The running total
//! drives the speed tier through fixed milestones.

use super::kinematic::MAX_SPEED_TIER;

#[derive(Debug, Clone)]
pub struct BounceScore {
    milestones: Vec<u64>,
    bounce_number: u64,
    score_points: u64,
    speed_tier: u8,
}

impl BounceScore {
    pub fn new(milestones: Vec<u64>) -> Self {
        Self {
            milestones,
            bounce_number: 0,
            score_points: 0,
            speed_tier: 0,
        }
    }

    pub fn bounce_number(&self) -> u64 {
        self.bounce_number
    }

    pub fn score_points(&self) -> u64 {
        self.score_points
    }

    pub fn total(&self) -> u64 {
        self.bounce_number + self.score_points
    }

    pub fn speed_tier(&self) -> u8 {
        self.speed_tier
    }

    /// Number of milestones `total` has reached
    pub fn tier_for(&self, total: u64) -> u8 {
        let reached = self.milestones.iter().filter(|&&m| total >= m).count();
        reached.min(MAX_SPEED_TIER as usize) as u8
    }

    /// Returns the new speed tier if it changed
    pub fn on_paddle_bounce(&mut self) -> Option<u8> {
        self.bounce_number += 1;
        self.refresh_tier()
    }

    /// Returns the new speed tier if it changed
    pub fn add_score_point(&mut self, points: u64) -> Option<u8> {
        self.score_points += points;
        self.refresh_tier()
    }

    fn refresh_tier(&mut self) -> Option<u8> {
        let tier = self.tier_for(self.total());
        if tier == self.speed_tier {
            return None;
        }
        self.speed_tier = tier;
        Some(tier)
    }

    pub fn reset(&mut self) {
        self.bounce_number = 0;
        self.score_points = 0;
        self.speed_tier = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score() -> BounceScore {
        BounceScore::new(vec![20, 40, 60])
    }

    #[test]
    fn test_total_is_bounces_plus_points() {
        let mut s = score();
        s.on_paddle_bounce();
        s.on_paddle_bounce();
        s.add_score_point(5);
        assert_eq!(s.bounce_number(), 2);
        assert_eq!(s.score_points(), 5);
        assert_eq!(s.total(), 7);
    }

    #[test]
    fn test_tier_change_reported_once() {
        let mut s = score();
        let changes: Vec<u8> = (0..25).filter_map(|_| s.on_paddle_bounce()).collect();
        assert_eq!(changes, vec![1]);
        assert_eq!(s.speed_tier(), 1);
    }

    #[test]
    fn test_pickup_can_skip_tiers() {
        let mut s = score();
        assert_eq!(s.add_score_point(45), Some(2));
        assert_eq!(s.add_score_point(100), Some(3));
        assert_eq!(s.add_score_point(100), None);
        assert_eq!(s.speed_tier(), 3);
    }

    #[test]
    fn test_tier_for_caps_at_three() {
        let s = BounceScore::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(s.tier_for(0), 0);
        assert_eq!(s.tier_for(2), 2);
        assert_eq!(s.tier_for(99), 3);
    }

    #[test]
    fn test_reset() {
        let mut s = score();
        s.add_score_point(50);
        s.reset();
        assert_eq!(s.total(), 0);
        assert_eq!(s.speed_tier(), 0);
    }
}
