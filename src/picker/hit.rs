use crate::geometry::{Point, normalize_angle};
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layout<'a> {
    Uniform,
    Custom(&'a [f64]),
}

/// Index of the item whose sector contains `offset`, or `None` inside the dead zone.
///
/// Sectors are bounded by the midpoints between angularly adjacent items. A pointer
/// lying exactly on a boundary belongs to the item that follows it counterclockwise.
/// Both layouts round their boundaries differently, so for evenly spaced custom
/// angles they only agree away from the boundaries themselves.
pub fn hit_test_item(offset: Point, n: usize, dead_radius: f64, layout: Layout) -> Option<usize> {
    if n == 0 || offset.length() < dead_radius {
        return None;
    }
    let theta = offset.angle();

    match layout {
        Layout::Uniform => Some(uniform_sector(theta, n)),
        Layout::Custom(angles) => custom_sector(theta, &angles[..n.min(angles.len())]),
    }
}

/// Index of the brush under `offset` on the ring of the item at `item_angle`.
///
/// Brushes are spread evenly on a ring of radius `outer_radius`, brush 0 facing the
/// item itself. Nothing is selected closer to the origin than `outer_radius - inner_radius`.
pub fn hit_test_sub_item(
    offset: Point,
    item_angle: f64,
    count: usize,
    inner_radius: f64,
    outer_radius: f64,
) -> Option<usize> {
    if count == 0 || offset.length() < outer_radius - inner_radius {
        return None;
    }
    let relative = normalize_angle(offset.angle() - item_angle);
    Some(uniform_sector(relative, count))
}

fn uniform_sector(theta: f64, n: usize) -> usize {
    let sector = ((theta * n as f64 / PI + 1.0) / 2.0).floor();
    // theta is in [0, 2π), so sector is in [0, n]
    (sector as usize) % n
}

fn custom_sector(theta: f64, angles: &[f64]) -> Option<usize> {
    let n = angles.len();
    match n {
        0 => return None,
        1 => return Some(0),
        _ => {}
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| normalize_angle(angles[a]).total_cmp(&normalize_angle(angles[b])));
    let sorted: Vec<f64> = order.iter().map(|&i| normalize_angle(angles[i])).collect();

    Some(order[sorted_sector(theta, &sorted)])
}

fn sorted_sector(theta: f64, s: &[f64]) -> usize {
    let last = s.len() - 1;

    // the first item's sector crosses 0 unless its lower bound lies past 2π
    let upper = 0.5 * (s[0] + s[1]);
    let lower = 0.5 * (s[last] + s[0] + TAU);
    let in_first = if lower >= TAU {
        (lower - TAU) <= theta && theta < upper
    } else {
        theta >= lower || theta < upper
    };
    if in_first {
        return 0;
    }

    (1..last)
        .find(|&i| {
            let doubled = 2.0 * theta - s[i];
            s[i - 1] <= doubled && doubled < s[i + 1]
        })
        .unwrap_or(last)
}
