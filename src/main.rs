use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use attendance_notifier::audit::AuditTrail;
use attendance_notifier::config::Config;
use attendance_notifier::db::init_db;
use attendance_notifier::docs::ApiDoc;
use attendance_notifier::notify::{DispatchSettings, ReportDispatcher};
use attendance_notifier::routes;
use attendance_notifier::scheduler::ReportScheduler;
use attendance_notifier::services::{FileAuditLog, MySqlDataStore, TwilioGateway};

#[get("/")]
async fn index() -> impl Responder {
    "Attendance notifier is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    let store = Arc::new(MySqlDataStore::new(pool, config.eligible_agreement.clone()));
    let gateway = Arc::new(TwilioGateway::new(config.twilio()));
    let audit_log = Arc::new(FileAuditLog::open(&config.audit_log_dir, &config.audit_log_file)?);

    let dispatcher = ReportDispatcher::new(
        store.clone(),
        store,
        gateway,
        AuditTrail::new(audit_log, config.report_timezone),
        DispatchSettings {
            template_id: config.twilio_template_id.clone(),
            window_days: config.attendance_window_days,
            excluded_device_serial: config.excluded_device_serial.clone(),
            timezone: config.report_timezone,
        },
    );

    let scheduler = ReportScheduler::new(
        config.report_schedule.clone(),
        config.report_timezone,
        dispatcher.clone(),
    );
    if config.scheduler_enabled {
        scheduler.start();
    } else {
        info!("Report scheduler disabled");
    }

    let server_addr = config.server_addr.clone();
    let dispatcher_data = Data::new(dispatcher);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(dispatcher_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    scheduler.stop();
    info!("Server stopped");
    Ok(())
}
