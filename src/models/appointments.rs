use crate::schema::appointments;
use serde::Serialize;

#[derive(Queryable, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: u64,
    pub service: String,
    pub name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub status: String,
    pub number_of_people: i32,
    pub email: String,
}

/// Column values for an insert or a full replace. Defaults have already been
/// applied by the time one of these exists.
#[derive(Insertable, AsChangeset, Clone, Debug, PartialEq)]
#[table_name = "appointments"]
pub struct NewAppointment {
    pub service: String,
    pub name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub status: String,
    pub number_of_people: i32,
    pub email: String,
}

impl NewAppointment {
    pub fn with_id(self, id: u64) -> Appointment {
        Appointment {
            id,
            service: self.service,
            name: self.name,
            phone: self.phone,
            date: self.date,
            time: self.time,
            status: self.status,
            number_of_people: self.number_of_people,
            email: self.email,
        }
    }
}

pub const APPOINT_STATUS_PENDING: &str = "Pending";
pub const DEFAULT_NUMBER_OF_PEOPLE: i32 = 1;
