//! Conversions between wire, storage and domain shapes.
//!
//! All functions are pure. The `id` passes through every conversion
//! untouched, and the reconciliation flag exists only on the storage side:
//! wire → row always starts clean, row → domain drops it.

use crate::api::{EventDto, ScheduleDto};
use crate::models::{Event, Schedule};
use crate::store::{EventRow, ScheduleRow};

// ===== Events =====

pub fn event_row_from_wire(dto: EventDto) -> EventRow {
    EventRow {
        id: dto.id,
        title: dto.title,
        subtitle: dto.subtitle,
        date: dto.date,
        image_url: dto.image_url,
        video_url: dto.video_url,
        dirty: false,
    }
}

pub fn event_from_row(row: EventRow) -> Event {
    Event {
        id: row.id,
        title: row.title,
        subtitle: row.subtitle,
        date: row.date,
        image_url: row.image_url,
        video_url: row.video_url,
    }
}

pub fn event_to_wire(event: &Event) -> EventDto {
    EventDto {
        id: event.id,
        title: event.title.clone(),
        subtitle: event.subtitle.clone(),
        date: event.date,
        image_url: event.image_url.clone(),
        video_url: event.video_url.clone(),
    }
}

// ===== Schedule =====

pub fn schedule_row_from_wire(dto: ScheduleDto) -> ScheduleRow {
    ScheduleRow {
        id: dto.id,
        title: dto.title,
        subtitle: dto.subtitle,
        date: dto.date,
        image_url: dto.image_url,
        dirty: false,
    }
}

pub fn schedule_from_row(row: ScheduleRow) -> Schedule {
    Schedule {
        id: row.id,
        title: row.title,
        subtitle: row.subtitle,
        date: row.date,
        image_url: row.image_url,
    }
}

pub fn schedule_to_wire(schedule: &Schedule) -> ScheduleDto {
    ScheduleDto {
        id: schedule.id,
        title: schedule.title.clone(),
        subtitle: schedule.subtitle.clone(),
        date: schedule.date,
        image_url: schedule.image_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event_dto() -> EventDto {
        EventDto {
            id: 31,
            title: "Workshop".to_string(),
            subtitle: "Room 2".to_string(),
            date: Utc.with_ymd_and_hms(2026, 4, 2, 14, 0, 0).unwrap(),
            image_url: "https://img.example.com/31.jpg".to_string(),
            video_url: "https://video.example.com/31.mp4".to_string(),
        }
    }

    #[test]
    fn test_wire_to_row_starts_clean() {
        let row = event_row_from_wire(event_dto());
        assert_eq!(row.id, 31);
        assert!(!row.dirty);
    }

    #[test]
    fn test_event_wire_row_domain_wire_preserves_fields() {
        let dto = event_dto();
        let event = event_from_row(event_row_from_wire(dto.clone()));
        assert_eq!(event.id, dto.id);
        assert_eq!(event_to_wire(&event), dto);
    }

    #[test]
    fn test_dirty_row_maps_to_same_domain_value() {
        let mut dirty = event_row_from_wire(event_dto());
        dirty.dirty = true;
        let clean = event_row_from_wire(event_dto());
        assert_eq!(event_from_row(dirty), event_from_row(clean));
    }

    #[test]
    fn test_schedule_mapping_keeps_id() {
        let dto = ScheduleDto {
            id: 9,
            title: "Doors open".to_string(),
            subtitle: String::new(),
            date: Utc.with_ymd_and_hms(2026, 4, 2, 8, 0, 0).unwrap(),
            image_url: String::new(),
        };
        let schedule = schedule_from_row(schedule_row_from_wire(dto.clone()));
        assert_eq!(schedule.id, 9);
        assert_eq!(schedule_to_wire(&schedule), dto);
    }
}
