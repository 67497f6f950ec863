//! Request bodies sent by the scenarios.

use chrono::{Local, NaiveDateTime, TimeDelta};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::session::Credentials;

const DEADLINE_DAYS: i64 = 7;

pub fn registration(credentials: &Credentials) -> Value {
    json!({
        "username": credentials.username,
        "email": credentials.email,
        "password": credentials.password,
    })
}

pub fn login(credentials: &Credentials) -> Value {
    json!({
        "email": credentials.email,
        "password": credentials.password,
    })
}

pub fn subject() -> Value {
    json!({
        "name": "Mathematics",
        "difficulty": "hard",
        "priority": 5,
        "color": "#3B82F6",
    })
}

pub fn subject_update() -> Value {
    json!({
        "name": "Advanced Mathematics",
        "difficulty": "hard",
        "priority": 4,
        "color": "#3B82F6",
    })
}

/// The subject id is random on purpose so the session does not depend on the subjects
/// scenario having run.
pub fn study_session() -> Value {
    json!({
        "subject_id": Uuid::new_v4().to_string(),
        "subject_name": "Physics",
        "date": Local::now().date_naive().to_string(),
        "start_time": "09:00",
        "end_time": "11:00",
        "duration": 120,
        "notes": "Quantum mechanics review",
    })
}

pub fn task() -> Value {
    json!({
        "title": "Complete Physics Assignment",
        "subject_name": "Physics",
        "deadline": iso_timestamp(one_week_out()),
        "priority": "high",
    })
}

pub fn goal() -> Value {
    json!({
        "title": "Study 20 hours this week",
        "target_hours": 20,
        "deadline": iso_timestamp(one_week_out()),
    })
}

pub fn schedule_request() -> Value {
    json!({
        "subjects": [
            {"name": "Mathematics", "difficulty": "hard", "exam_date": "2025-02-15"},
            {"name": "Physics", "difficulty": "medium", "exam_date": "2025-02-20"},
        ],
        "available_hours_per_day": 4,
        "study_preferences": "I prefer studying difficult subjects in the morning",
    })
}

fn one_week_out() -> NaiveDateTime {
    (Local::now() + TimeDelta::days(DEADLINE_DAYS)).naive_local()
}

fn iso_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
