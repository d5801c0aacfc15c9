use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use dotenvy::dotenv;

use crate::scheduler::CronSchedule;
use crate::services::TwilioConfig;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_dispatch_per_min: u32,

    // Twilio
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_whatsapp_from: String,
    pub twilio_template_id: String,
    pub twilio_api_base: String,

    // Weekly run
    pub report_schedule: CronSchedule,
    pub report_timezone: Tz,
    pub scheduler_enabled: bool,

    // Audit trail
    pub audit_log_dir: String,
    pub audit_log_file: String,

    // Attendance query
    pub attendance_window_days: u32,
    pub excluded_device_serial: String,
    pub eligible_agreement: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let report_timezone = var_or("REPORT_TIMEZONE", "America/Argentina/Buenos_Aires");
        let report_timezone = Tz::from_str(&report_timezone)
            .map_err(|e| anyhow!("REPORT_TIMEZONE is not a valid time zone: {e}"))?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_addr: var_or("SERVER_ADDR", "0.0.0.0:3000"),
            api_prefix: var_or("API_PREFIX", "/api"),

            rate_dispatch_per_min: parsed("RATE_DISPATCH_PER_MIN", 10)?,

            twilio_account_sid: required("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: required("TWILIO_AUTH_TOKEN")?,
            twilio_whatsapp_from: required("TWILIO_WHATSAPP_FROM")?,
            twilio_template_id: required("TWILIO_HOUR_TEMPLATE_ID")?,
            twilio_api_base: var_or("TWILIO_API_BASE", "https://api.twilio.com"),

            report_schedule: CronSchedule::parse(&var_or("REPORT_SCHEDULE", "0 9 * * 1"))
                .context("REPORT_SCHEDULE")?,
            report_timezone,
            scheduler_enabled: parsed("SCHEDULER_ENABLED", true)?,

            audit_log_dir: var_or("AUDIT_LOG_DIR", "logs"),
            audit_log_file: var_or("AUDIT_LOG_FILE", "twilio-reports.log"),

            attendance_window_days: parsed("ATTENDANCE_WINDOW_DAYS", 7)?,
            excluded_device_serial: var_or("EXCLUDED_DEVICE_SERIAL", "L19848894"),
            eligible_agreement: var_or("ELIGIBLE_AGREEMENT", "UOCRA"),
        })
    }

    pub fn twilio(&self) -> TwilioConfig {
        TwilioConfig {
            account_sid: self.twilio_account_sid.clone(),
            auth_token: self.twilio_auth_token.clone(),
            whatsapp_from: self.twilio_whatsapp_from.clone(),
            api_base: self.twilio_api_base.clone(),
        }
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}
