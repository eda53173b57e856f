mod requests;
mod utils;

use crate::{
    database::AppointmentStore,
    models::appointments::NewAppointment,
    protocol::ApiError,
};
use actix_web::{delete, get, post, put, web, HttpResponse};
use tracing::{debug, error, info};

use self::{
    requests::AppointmentRequest,
    utils::{parse_id, validate_appointment},
};

const INVALID_DATA: &str = "Invalid appointment data";
const INVALID_ID: &str = "Invalid appointment ID";
const NOT_FOUND: &str = "Appointment not found";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        debug!("Rejected appointment body: {}", err);
        ApiError::bad_request(INVALID_DATA).into()
    }))
    .service(list_appointments)
    .service(add_appointment)
    .service(view_appointment)
    .service(update_appointment)
    .service(delete_appointment);
}

/// Logs the underlying error and hides it behind `message`.
fn internal(message: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |err| {
        error!("{}: {:#}", message, err);
        ApiError::internal(message)
    }
}

fn id_from_path(id: &str) -> Result<u64, ApiError> {
    parse_id(id).ok_or_else(|| ApiError::bad_request(INVALID_ID))
}

fn data_from_body(info: web::Json<AppointmentRequest>) -> Result<NewAppointment, ApiError> {
    validate_appointment(info.into_inner()).map_err(|err| {
        debug!("Invalid appointment data: {:#}", err);
        ApiError::bad_request(INVALID_DATA)
    })
}

#[get("")]
async fn list_appointments(store: web::Data<dyn AppointmentStore>) -> Result<HttpResponse, ApiError> {
    let appointments = store
        .list()
        .await
        .map_err(internal("Failed to fetch appointments"))?;
    Ok(HttpResponse::Ok().json(appointments))
}

#[post("")]
async fn add_appointment(
    store: web::Data<dyn AppointmentStore>,
    info: web::Json<AppointmentRequest>,
) -> Result<HttpResponse, ApiError> {
    let data = data_from_body(info)?;
    let saved = store
        .insert(data)
        .await
        .map_err(internal("Failed to add appointment"))?;
    info!("Added appointment {} on {}", saved.id, saved.date);
    Ok(HttpResponse::Created().json(saved))
}

#[get("/{id}")]
async fn view_appointment(
    store: web::Data<dyn AppointmentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = id_from_path(&path)?;
    match store
        .get(id)
        .await
        .map_err(internal("Failed to fetch appointment"))?
    {
        Some(appointment) => Ok(HttpResponse::Ok().json(appointment)),
        None => Err(ApiError::not_found(NOT_FOUND)),
    }
}

#[put("/{id}")]
async fn update_appointment(
    store: web::Data<dyn AppointmentStore>,
    path: web::Path<String>,
    info: web::Json<AppointmentRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = id_from_path(&path)?;
    let data = data_from_body(info)?;
    match store
        .update(id, data)
        .await
        .map_err(internal("Failed to update appointment"))?
    {
        Some(updated) => {
            info!("Updated appointment {}", id);
            Ok(HttpResponse::Ok().json(updated))
        }
        None => Err(ApiError::not_found(NOT_FOUND)),
    }
}

#[delete("/{id}")]
async fn delete_appointment(
    store: web::Data<dyn AppointmentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = id_from_path(&path)?;
    let deleted = store
        .delete(id)
        .await
        .map_err(internal("Failed to delete appointment"))?;
    if deleted {
        info!("Deleted appointment {}", id);
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::not_found(NOT_FOUND))
    }
}
