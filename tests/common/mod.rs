#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use attendance_notifier::audit::AuditTrail;
use attendance_notifier::model::{AttendanceRecord, AttendanceWindow, Employee};
use attendance_notifier::notify::{DispatchSettings, ReportDispatcher, TemplateVariables};
use attendance_notifier::services::{
    AttendanceStore, AuditLog, EmployeeDirectory, GatewayResponse, NotificationGateway,
};

pub const TEMPLATE_ID: &str = "HX0000000000000000000000000000test";

pub fn employee(dni: &str, telefono: &str) -> Employee {
    Employee {
        dni: dni.to_string(),
        nombre: format!("Nombre{dni}"),
        apellido: format!("Apellido{dni}"),
        telefono: telefono.to_string(),
    }
}

pub fn record(dni: &str, day: u32, first: Option<&str>, last: Option<&str>) -> AttendanceRecord {
    let time = |t: &str| NaiveTime::parse_from_str(t, "%H:%M:%S").unwrap();
    AttendanceRecord {
        employee_id: dni.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
        first_time: first.map(time),
        device_in: first.map(|_| "Acceso Norte".to_string()),
        last_time: last.map(time),
        device_out: last.map(|_| "Acceso Norte".to_string()),
    }
}

/// Employee directory backed by a fixed list.
#[derive(Default)]
pub struct InMemoryDirectory {
    pub employees: Vec<Employee>,
    pub fail_listing: bool,
    pub panic_on_lookup: bool,
}

#[async_trait]
impl EmployeeDirectory for InMemoryDirectory {
    async fn list_eligible(&self) -> Result<Vec<Employee>> {
        if self.fail_listing {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.employees.clone())
    }

    async fn get_by_dni(&self, dni: &str) -> Result<Option<Employee>> {
        if self.panic_on_lookup {
            panic!("directory exploded");
        }
        Ok(self.employees.iter().find(|e| e.dni == dni).cloned())
    }
}

/// Attendance rows per dni. Dnis listed in `failing` return an error,
/// dnis in `panicking` panic.
#[derive(Default)]
pub struct InMemoryAttendance {
    pub records: HashMap<String, Vec<AttendanceRecord>>,
    pub failing: Vec<String>,
    pub panicking: Vec<String>,
    pub windows: Mutex<Vec<AttendanceWindow>>,
}

impl InMemoryAttendance {
    pub fn with(mut self, dni: &str, records: Vec<AttendanceRecord>) -> Self {
        self.records.insert(dni.to_string(), records);
        self
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendance {
    async fn get_records(&self, dni: &str, window: &AttendanceWindow) -> Result<Vec<AttendanceRecord>> {
        self.windows.lock().unwrap().push(window.clone());
        if self.failing.iter().any(|d| d == dni) {
            return Err(anyhow!("lock wait timeout exceeded"));
        }
        if self.panicking.iter().any(|d| d == dni) {
            panic!("attendance store blew up for {dni}");
        }
        Ok(self.records.get(dni).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub address: String,
    pub template_id: String,
    pub variables: TemplateVariables,
}

/// Records every send; rejects addresses listed in `reject`.
#[derive(Default)]
pub struct RecordingGateway {
    pub reject: HashMap<String, String>,
    pub sent: Mutex<Vec<SentMessage>>,
}

impl RecordingGateway {
    pub fn rejecting(address: &str, error: &str) -> Self {
        let mut reject = HashMap::new();
        reject.insert(address.to_string(), error.to_string());
        Self {
            reject,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send_templated(
        &self,
        address: &str,
        template_id: &str,
        variables: &TemplateVariables,
    ) -> GatewayResponse {
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentMessage {
            address: address.to_string(),
            template_id: template_id.to_string(),
            variables: variables.clone(),
        });
        match self.reject.get(address) {
            Some(error) => GatewayResponse::Rejected { error: error.clone() },
            None => GatewayResponse::Delivered {
                message_id: format!("SM{:04}", sent.len()),
                status: "queued".to_string(),
            },
        }
    }
}

#[derive(Default)]
pub struct MemoryAuditLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryAuditLog {
    /// Lines without their timestamp prefix.
    pub fn messages(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|l| l.split_once("] ").map(|(_, m)| m.to_string()).unwrap_or_default())
            .collect()
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

pub struct Harness {
    pub dispatcher: ReportDispatcher,
    pub directory: Arc<InMemoryDirectory>,
    pub attendance: Arc<InMemoryAttendance>,
    pub gateway: Arc<RecordingGateway>,
    pub audit: Arc<MemoryAuditLog>,
}

pub fn harness(
    directory: InMemoryDirectory,
    attendance: InMemoryAttendance,
    gateway: RecordingGateway,
) -> Harness {
    let directory = Arc::new(directory);
    let attendance = Arc::new(attendance);
    let gateway = Arc::new(gateway);
    let audit = Arc::new(MemoryAuditLog::default());

    let dispatcher = ReportDispatcher::new(
        directory.clone(),
        attendance.clone(),
        gateway.clone(),
        AuditTrail::new(audit.clone(), chrono_tz::America::Argentina::Buenos_Aires),
        DispatchSettings {
            template_id: TEMPLATE_ID.to_string(),
            window_days: 7,
            excluded_device_serial: "L19848894".to_string(),
            timezone: chrono_tz::America::Argentina::Buenos_Aires,
        },
    );

    Harness {
        dispatcher,
        directory,
        attendance,
        gateway,
        audit,
    }
}
