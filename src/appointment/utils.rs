use anyhow::{bail, Context};

use super::requests::AppointmentRequest;
use crate::{
    models::appointments::{NewAppointment, APPOINT_STATUS_PENDING, DEFAULT_NUMBER_OF_PEOPLE},
    utils::{is_email_shaped, parse_date_str},
};

fn required(field: &str, value: &str) -> anyhow::Result<String> {
    let value = value.trim();
    if value.is_empty() {
        bail!("{} is required", field);
    }
    Ok(value.to_string())
}

/// Checks a request body and fills in the column defaults.
pub fn validate_appointment(info: AppointmentRequest) -> anyhow::Result<NewAppointment> {
    let service = required("service", &info.service)?;
    let name = required("name", &info.name)?;
    let phone = required("phone", &info.phone)?;
    let time = required("time", &info.time)?;

    let date = info.date.trim().to_string();
    parse_date_str(&date)?;

    let email = required("email", &info.email)?.to_lowercase();
    if !is_email_shaped(&email) {
        bail!("Please fill a valid email address");
    }

    let status = match info.status.as_deref().map(str::trim) {
        Some(status) if !status.is_empty() => status.to_string(),
        _ => APPOINT_STATUS_PENDING.to_string(),
    };

    let number_of_people = match info.number_of_people {
        Some(n) if n < 0 => bail!("numberOfPeople cannot be negative"),
        Some(n) => i32::try_from(n).context("numberOfPeople is too large")?,
        None => DEFAULT_NUMBER_OF_PEOPLE,
    };

    Ok(NewAppointment {
        service,
        name,
        phone,
        date,
        time,
        status,
        number_of_people,
        email,
    })
}

pub fn parse_id(id: &str) -> Option<u64> {
    id.parse().ok().filter(|&id| id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AppointmentRequest {
        AppointmentRequest {
            service: " Haircut ".to_string(),
            name: "A".to_string(),
            phone: "555".to_string(),
            date: "2024-05-01".to_string(),
            time: "10:00".to_string(),
            status: None,
            number_of_people: None,
            email: "A@X.com".to_string(),
        }
    }

    #[test]
    fn fills_defaults_and_normalizes() {
        let data = validate_appointment(request()).unwrap();
        assert_eq!(data.service, "Haircut");
        assert_eq!(data.status, "Pending");
        assert_eq!(data.number_of_people, 1);
        assert_eq!(data.email, "a@x.com");
    }

    #[test]
    fn keeps_given_status_and_count() {
        let data = validate_appointment(AppointmentRequest {
            status: Some("Confirmed".to_string()),
            number_of_people: Some(0),
            ..request()
        })
        .unwrap();
        assert_eq!(data.status, "Confirmed");
        assert_eq!(data.number_of_people, 0);
    }

    #[test]
    fn rejects_bad_fields() {
        let cases = [
            AppointmentRequest { name: "  ".to_string(), ..request() },
            AppointmentRequest { phone: String::new(), ..request() },
            AppointmentRequest { date: "2024-5-1".to_string(), ..request() },
            AppointmentRequest { date: "2024-02-30".to_string(), ..request() },
            AppointmentRequest { email: "nobody".to_string(), ..request() },
            AppointmentRequest { number_of_people: Some(-1), ..request() },
            AppointmentRequest { number_of_people: Some(i64::MAX), ..request() },
        ];
        for case in cases {
            assert!(validate_appointment(case).is_err());
        }
    }

    #[test]
    fn ids_are_positive_integers() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("507f1f77bcf86cd799439011"), None);
    }
}
