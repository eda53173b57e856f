#[macro_use]
extern crate diesel;

mod appointment;
mod config;
mod database;
mod models;
mod protocol;
mod report;
mod schema;
mod sheets;
mod utils;

use std::sync::Arc;

use actix_web::{get, middleware::Logger, web, App, HttpServer, Responder};
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use tracing::info;

use crate::{
    config::{Config, ReportConfig},
    database::{AppointmentStore, MysqlStore},
    report::{ReportDestination, ReportService},
    sheets::{GoogleSheets, ServiceAccount},
};

type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;

#[get("/")]
async fn index() -> impl Responder {
    "Appointment Management API"
}

fn report_destination(config: &ReportConfig) -> anyhow::Result<ReportDestination> {
    let http = reqwest::Client::new();
    let auth = ServiceAccount::new(config.client_email.clone(), &config.private_key, http.clone())?;
    Ok(ReportDestination {
        spreadsheet_id: config.spreadsheet_id.clone(),
        auth: Arc::new(auth),
        sheets: Arc::new(GoogleSheets::new(http)),
    })
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let manager = ConnectionManager::<MysqlConnection>::new(config.database_url.as_str());
    let pool = r2d2::Pool::builder()
        .build(manager)
        .context("Failed to create pool")?;

    let store: Arc<dyn AppointmentStore> = Arc::new(MysqlStore::new(pool));
    let destination = config.reports.as_ref().map(report_destination).transpose()?;
    let reports = web::Data::new(ReportService::new(destination, Arc::clone(&store)));
    let store = web::Data::from(store);

    let bind = (config.host.clone(), config.port);
    info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .app_data(reports.clone())
            .service(index)
            // appointments
            .service(web::scope("/api/appointments").configure(appointment::config))
            // reports
            .service(web::scope("/api/reports").configure(report::config))
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
