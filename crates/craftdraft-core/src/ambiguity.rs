//! Cycling through the alternatives of an ambiguous edit.

use crate::kernel::Candidate;
use crate::overlay::{OverlayItem, OverlayStyle};

/// Marker size of the current candidate, in screen pixels.
const CURRENT_SIZE: f64 = 6.0;
/// Marker size of the other candidates.
const OTHER_SIZE: f64 = 4.0;

/// Holds the candidates of an ambiguous kernel answer and the one the user
/// is looking at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmbiguityController {
    candidates: Vec<Candidate>,
    index: usize,
}

impl AmbiguityController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the candidates and select the first.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.index = 0;
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.index = 0;
    }

    /// True while there is something to choose from.
    pub fn is_active(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Candidate> {
        self.candidates.get(self.index)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Move by `delta`, wrapping in both directions. No-op when empty.
    pub fn cycle(&mut self, delta: i64) {
        let n = self.candidates.len() as i64;
        if n == 0 {
            return;
        }
        self.index = (self.index as i64 + delta).rem_euclid(n) as usize;
    }

    /// Wheel input: up (or zero) steps forward, down steps back.
    pub fn on_wheel(&mut self, delta_y: f64) {
        self.cycle(if delta_y >= 0.0 { 1 } else { -1 });
    }

    /// Markers for every candidate, the current one emphasised.
    pub fn overlay(&self) -> Vec<OverlayItem> {
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == self.index {
                    OverlayItem::marker(c.point, CURRENT_SIZE, OverlayStyle::CurrentCandidate)
                } else {
                    OverlayItem::marker(c.point, OTHER_SIZE, OverlayStyle::Candidate)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|index| Candidate { index, point: Point::new(index as f64, 0.0), t: 0.0 })
            .collect()
    }

    #[test]
    fn test_set_candidates_resets_index() {
        let mut amb = AmbiguityController::new();
        amb.set_candidates(candidates(3));
        amb.cycle(2);
        amb.set_candidates(candidates(2));
        assert_eq!(amb.current_index(), 0);
    }

    #[test]
    fn test_cycle_wraps_both_ways() {
        let mut amb = AmbiguityController::new();
        amb.set_candidates(candidates(3));
        for _ in 0..3 {
            amb.cycle(1);
        }
        assert_eq!(amb.current_index(), 0);
        amb.cycle(-1);
        assert_eq!(amb.current_index(), 2);
        amb.cycle(-7);
        assert_eq!(amb.current_index(), 1);
    }

    #[test]
    fn test_wheel_direction() {
        let mut amb = AmbiguityController::new();
        amb.set_candidates(candidates(4));
        amb.on_wheel(0.0);
        assert_eq!(amb.current_index(), 1);
        amb.on_wheel(-3.0);
        amb.on_wheel(-3.0);
        assert_eq!(amb.current_index(), 3);
    }

    #[test]
    fn test_empty_is_noop() {
        let mut amb = AmbiguityController::new();
        amb.cycle(1);
        amb.on_wheel(1.0);
        assert!(!amb.is_active());
        assert!(amb.current().is_none());
        assert!(amb.overlay().is_empty());
    }

    #[test]
    fn test_overlay_highlights_current() {
        let mut amb = AmbiguityController::new();
        amb.set_candidates(candidates(3));
        amb.cycle(1);
        let styles: Vec<OverlayStyle> = amb.overlay().iter().map(OverlayItem::style).collect();
        assert_eq!(
            styles,
            vec![OverlayStyle::Candidate, OverlayStyle::CurrentCandidate, OverlayStyle::Candidate]
        );
    }
}
