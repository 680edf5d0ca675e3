//! # Occupancy
//!
//! Room counts by status and the occupancy rate, as a whole percentage
//! rounded half away from zero. An empty property has a rate of 0.

use homestay_core::RoomStatus;
use serde::{Deserialize, Serialize};

/// Room counts by status for a snapshot of the inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyBreakdown {
    /// Rooms in the snapshot.
    pub total: usize,
    /// Rooms with a guest checked in.
    pub occupied: usize,
    /// Rooms free to be occupied.
    pub available: usize,
    /// Rooms out of service.
    pub maintenance: usize,
}

impl OccupancyBreakdown {
    /// Count a snapshot of room statuses.
    pub fn from_statuses(statuses: impl IntoIterator<Item = RoomStatus>) -> Self {
        let mut breakdown = Self::default();
        for status in statuses {
            breakdown.total += 1;
            match status {
                RoomStatus::Occupied => breakdown.occupied += 1,
                RoomStatus::Available => breakdown.available += 1,
                RoomStatus::Maintenance => breakdown.maintenance += 1,
            }
        }
        breakdown
    }

    /// Occupied rooms as a percentage of all rooms.
    pub fn rate(&self) -> u8 {
        percentage(self.occupied, self.total)
    }
}

/// Occupancy rate of a snapshot of room statuses.
pub fn occupancy_rate(statuses: impl IntoIterator<Item = RoomStatus>) -> u8 {
    OccupancyBreakdown::from_statuses(statuses).rate()
}

/// `part / whole × 100`, rounded half away from zero, 0 when `whole` is 0.
fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u128;
    let whole = whole as u128;
    // (200·p + w) / 2w == round_half_up(100·p / w) for non-negative inputs.
    let rounded = (200 * part + whole) / (2 * whole);
    u8::try_from(rounded).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_of_three_is_33() {
        let rate = occupancy_rate([
            RoomStatus::Occupied,
            RoomStatus::Available,
            RoomStatus::Available,
        ]);
        assert_eq!(rate, 33);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(occupancy_rate(std::iter::empty()), 0);
        assert_eq!(OccupancyBreakdown::default().rate(), 0);
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(1, 201), 0);
    }

    #[test]
    fn breakdown_counts_every_status() {
        let breakdown = OccupancyBreakdown::from_statuses([
            RoomStatus::Occupied,
            RoomStatus::Occupied,
            RoomStatus::Available,
            RoomStatus::Maintenance,
        ]);
        assert_eq!(breakdown.total, 4);
        assert_eq!(breakdown.occupied, 2);
        assert_eq!(breakdown.available, 1);
        assert_eq!(breakdown.maintenance, 1);
        assert_eq!(breakdown.rate(), 50);
    }

    #[test]
    fn fully_occupied_is_100() {
        assert_eq!(occupancy_rate(vec![RoomStatus::Occupied; 7]), 100);
    }
}
