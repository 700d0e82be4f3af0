//! Angle allocation for materials whose position on the wheel is not fixed.
//!
//! Entries are read as a circular sequence: every run of unset entries lying between
//! two fixed entries is spread evenly inside the gap that separates them.

use crate::geometry::normalize_angle;
use std::f64::consts::TAU;

/// `end` is unwrapped: it is always greater than `start`, possibly beyond `2π`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsetInterval {
    pub start: f64,
    pub end: f64,
    pub ids: Vec<usize>,
}

impl UnsetInterval {
    pub fn interior_angles(&self) -> impl Iterator<Item = f64> + '_ {
        let step = (self.end - self.start) / (self.ids.len() + 1) as f64;
        (1..=self.ids.len()).map(move |k| normalize_angle(self.start + step * k as f64))
    }
}

pub fn unset_intervals(entries: &[Option<f64>]) -> Vec<UnsetInterval> {
    let n = entries.len();
    let fixed: Vec<usize> = (0..n).filter(|&i| entries[i].is_some()).collect();

    if fixed.is_empty() {
        if n == 0 {
            return Vec::new();
        }
        return vec![UnsetInterval {
            start: 0.0,
            end: TAU,
            ids: (0..n).collect(),
        }];
    }

    fixed
        .iter()
        .enumerate()
        .filter_map(|(k, &s)| {
            let e = fixed[(k + 1) % fixed.len()];
            let ids: Vec<usize> = (1..n)
                .map(|step| (s + step) % n)
                .take_while(|&i| i != e)
                .collect();
            if ids.is_empty() {
                return None;
            }

            let start = entries[s].unwrap_or_default();
            let mut end = entries[e].unwrap_or_default();
            // a single fixed entry bounds the whole circle on both sides
            if end <= start {
                end += TAU;
            }
            Some(UnsetInterval { start, end, ids })
        })
        .collect()
}

pub fn allocate_angles(entries: &[Option<f64>]) -> Vec<f64> {
    let mut angles: Vec<f64> = entries.iter().map(|a| a.unwrap_or_default()).collect();

    for interval in unset_intervals(entries) {
        for (&id, angle) in interval.ids.iter().zip(interval.interior_angles()) {
            angles[id] = angle;
        }
    }
    angles
}
