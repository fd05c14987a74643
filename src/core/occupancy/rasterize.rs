// Interval rasterizer: booking intervals in, dense hourly occupancy out.
//
// Purpose
// - Turn irregular [start, end) bookings into one sample per room per working hour.
//
// Responsibilities
// - Group events per room and build the room's timeline from the day of its first
//   booking up to today's midnight, restricted to the working-hour window.
// - Mark every timeline hour touched by the booking's hour-rounded range as occupied.
//
// Boundaries
// - Pure. The caller supplies the current time so "today" is deterministic.

use crate::core::occupancy::booking_event::BookingEvent;
use crate::core::occupancy::sample::{OccupancyByRoom, OccupancySample};
use crate::core::occupancy::working_hours::WorkingHours;
use crate::core::time_grid::{ceil_to_hour, floor_to_day, floor_to_hour, hours_between};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::debug;

pub fn rasterize(events: &[BookingEvent], window: WorkingHours, now: NaiveDateTime) -> OccupancyByRoom {
    let today = floor_to_day(now);

    let mut by_room: BTreeMap<&str, Vec<&BookingEvent>> = BTreeMap::new();
    for event in events {
        by_room.entry(event.room_id.as_str()).or_default().push(event);
    }

    by_room
        .into_iter()
        .filter_map(|(room_id, room_events)| {
            rasterize_room(room_id, &room_events, window, today).map(|samples| (room_id.to_string(), samples))
        })
        .collect()
}

fn rasterize_room(
    room_id: &str,
    events: &[&BookingEvent],
    window: WorkingHours,
    today: NaiveDateTime,
) -> Option<Vec<OccupancySample>> {
    let first_day = floor_to_day(events.iter().map(|event| event.start).min()?);
    if first_day >= today {
        debug!(room_id, "no completed day of history yet");
        return None;
    }

    // Keyed by hour so each booking's rounded range is a single ordered range query.
    let mut timeline: BTreeMap<NaiveDateTime, bool> = hours_between(first_day, today)
        .filter(|hour| window.contains(*hour))
        .map(|hour| (hour, false))
        .collect();
    if timeline.is_empty() {
        return None;
    }

    for event in events {
        if !event.has_duration() {
            debug!(room_id, start = %event.start, end = %event.end, "ignoring booking without duration");
            continue;
        }
        let from = floor_to_hour(event.start);
        let to = ceil_to_hour(event.end);
        for (_, occupied) in timeline.range_mut(from..to) {
            *occupied = true;
        }
    }

    Some(
        timeline
            .into_iter()
            .map(|(hour, occupied)| OccupancySample::new(hour, occupied))
            .collect(),
    )
}
