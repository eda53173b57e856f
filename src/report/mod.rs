mod lifecycle;
mod rows;
mod service;
mod window;

use crate::protocol::{ApiError, MessageResponse};
use actix_web::{get, web, HttpResponse};

use self::window::ReportPeriod;

pub use self::service::{ReportDestination, ReportService};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(daily).service(weekly).service(monthly);
}

crate::report_funcs! {
    (daily, "/daily", ReportPeriod::Daily),
    (weekly, "/weekly", ReportPeriod::Weekly),
    (monthly, "/monthly", ReportPeriod::Monthly),
}
