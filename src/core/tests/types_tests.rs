use chrono::NaiveDate;

use crate::core::types::{
    ClockTime, DayOfWeek, EventDraft, Occurrence, ProgramType, ScheduleEvent, Semester,
    SessionType, TimeRange,
};

fn hm(hours: u16, minutes: u16) -> ClockTime {
    ClockTime::from_hm(hours, minutes).unwrap()
}

#[test]
fn test_day_of_week_range() {
    assert!(DayOfWeek::new(0).is_none());
    assert_eq!(DayOfWeek::new(1), Some(DayOfWeek::MONDAY));
    assert_eq!(DayOfWeek::new(7), Some(DayOfWeek::SUNDAY));
    assert!(DayOfWeek::new(8).is_none());
}

#[test]
fn test_day_of_date_is_monday_based() {
    // 2025-03-10 is a Monday, 2025-03-16 a Sunday
    let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let sunday = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();

    assert_eq!(DayOfWeek::of_date(monday), DayOfWeek::MONDAY);
    assert_eq!(DayOfWeek::of_date(sunday).number(), 7);
}

#[test]
fn test_clock_time_display() {
    assert_eq!(hm(9, 5).to_string(), "09:05");
    assert_eq!(hm(23, 59).to_string(), "23:59");
    assert!(ClockTime::from_hm(24, 0).is_none());
}

#[test]
fn test_time_range_requires_end_after_start() {
    assert!(TimeRange::new(hm(10, 0), hm(9, 0)).is_err());
    assert!(TimeRange::new(hm(10, 0), hm(10, 0)).is_err());
    assert!(TimeRange::new(hm(10, 0), hm(10, 1)).is_ok());
}

#[test]
fn test_time_range_half_open_overlap() {
    let morning = TimeRange::new(hm(9, 0), hm(10, 0)).unwrap();
    let touching = TimeRange::new(hm(10, 0), hm(11, 0)).unwrap();
    let inside = TimeRange::new(hm(9, 15), hm(9, 45)).unwrap();

    assert!(!morning.overlaps(&touching));
    assert!(!touching.overlaps(&morning));
    assert!(morning.overlaps(&inside));
    assert!(inside.overlaps(&morning));
    assert!(morning.overlaps(&morning));
}

#[test]
fn test_occurrence_fields() {
    let anchor = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let recurring = Occurrence::Recurring { day: DayOfWeek::MONDAY, anchor: Some(anchor) };
    let once = Occurrence::Once { date: anchor, day: None };

    assert!(recurring.is_recurring());
    assert_eq!(recurring.day_of_week(), Some(DayOfWeek::MONDAY));
    assert_eq!(recurring.event_date(), Some(anchor));

    assert!(!once.is_recurring());
    assert_eq!(once.day_of_week(), None);
    assert_eq!(once.event_date(), Some(anchor));
}

#[test]
fn test_semester_bounds_are_inclusive() {
    let start = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 6, 27).unwrap();
    let semester = Semester::new(start, end).unwrap();

    assert!(semester.contains(start));
    assert!(semester.contains(end));
    assert!(!semester.contains(NaiveDate::from_ymd_opt(2025, 6, 28).unwrap()));
    assert!(Semester::new(end, start).is_err());
}

#[test]
fn test_event_serialises_as_camel_case_record() {
    let event = ScheduleEvent::try_from(EventDraft {
        id: Some("e1".into()),
        course_id: Some("CS101".into()),
        lecturer_id: Some("L1".into()),
        room_id: Some("R1".into()),
        department: Some("CS".into()),
        day_of_week: Some(2),
        start_time: Some("09:00".into()),
        end_time: Some("10:50".into()),
        is_recurring: true,
        session_type: Some(SessionType::Practical),
        ..Default::default()
    })
    .unwrap();

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["courseId"], "CS101");
    assert_eq!(json["dayOfWeek"], 2);
    assert_eq!(json["startTime"], "09:00");
    assert_eq!(json["isRecurring"], true);
    assert_eq!(json["sessionType"], "PH");
    assert_eq!(json["programType"], "day");
    assert!(json.get("eventDate").is_none());

    let back: ScheduleEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back, event);
}

#[test]
fn test_deserialising_invalid_event_fails() {
    let json = r#"{"id":"e1","courseId":"C","lecturerId":"L","roomId":"R","department":"D",
        "startTime":"10:00","endTime":"09:00","isRecurring":true,"dayOfWeek":1}"#;

    let result: Result<ScheduleEvent, _> = serde_json::from_str(json);
    let message = result.unwrap_err().to_string();
    assert!(message.contains("must be after"), "unexpected error: {}", message);
}

#[test]
fn test_event_display() {
    let event = ScheduleEvent::try_from(EventDraft {
        id: Some("e1".into()),
        course_id: Some("CS101".into()),
        lecturer_id: Some("L1".into()),
        room_id: Some("R1".into()),
        department: Some("CS".into()),
        event_date: Some("2025-03-10".into()),
        start_time: Some("09:00".into()),
        end_time: Some("10:00".into()),
        program_type: Some(ProgramType::Evening),
        ..Default::default()
    })
    .unwrap();

    let display = event.to_string();
    assert!(display.contains("CS101"));
    assert!(display.contains("on 2025-03-10"));
    assert!(display.contains("09:00-10:00"));
    assert!(display.contains("R1"));
}
