use serde_json::Value;

use crate::models::appointments::Appointment;

/// Header row of every report sheet. Must stay in step with [`project`].
pub const REPORT_HEADERS: [&str; 8] = [
    "Service",
    "Name",
    "Phone",
    "Date",
    "Time",
    "Status",
    "Number of People",
    "Email",
];

pub type ReportRow = [Value; 8];

pub fn header_row() -> Vec<Value> {
    REPORT_HEADERS.iter().map(|&header| Value::from(header)).collect()
}

/// Maps a record onto the report columns. `date` is passed through as text.
pub fn project(appointment: &Appointment) -> ReportRow {
    [
        Value::from(appointment.service.as_str()),
        Value::from(appointment.name.as_str()),
        Value::from(appointment.phone.as_str()),
        Value::from(appointment.date.as_str()),
        Value::from(appointment.time.as_str()),
        Value::from(appointment.status.as_str()),
        Value::from(appointment.number_of_people),
        Value::from(appointment.email.as_str()),
    ]
}
