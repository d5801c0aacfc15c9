use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, instrument};

use crate::model::{AttendanceRecord, AttendanceWindow, Employee};
use crate::services::{AttendanceStore, EmployeeDirectory};

#[derive(FromRow)]
struct EmployeeRow {
    dni: String,
    nombre: String,
    apellido: String,
    telefono: Option<String>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            dni: row.dni,
            nombre: row.nombre,
            apellido: row.apellido,
            telefono: row.telefono.unwrap_or_default(),
        }
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    id_empleado: String,
    fecha_acceso: NaiveDate,
    primera_hora: Option<NaiveTime>,
    dispositivo_entrada: Option<String>,
    ultima_hora: Option<NaiveTime>,
    dispositivo_salida: Option<String>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            employee_id: row.id_empleado,
            date: row.fecha_acceso,
            first_time: row.primera_hora,
            device_in: row.dispositivo_entrada,
            last_time: row.ultima_hora,
            device_out: row.dispositivo_salida,
        }
    }
}

/// Payroll (`nomina`) and access log (`registros_acceso`) tables.
#[derive(Clone)]
pub struct MySqlDataStore {
    pool: MySqlPool,
    eligible_agreement: String,
}

impl MySqlDataStore {
    pub fn new(pool: MySqlPool, eligible_agreement: impl Into<String>) -> Self {
        Self {
            pool,
            eligible_agreement: eligible_agreement.into(),
        }
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlDataStore {
    #[instrument(skip(self), fields(agreement = %self.eligible_agreement))]
    async fn list_eligible(&self) -> Result<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT dni, nombre, apellido, telefono
            FROM nomina
            WHERE (ingreso IS NULL OR CURDATE() >= ingreso)
              AND (egreso IS NULL OR CURDATE() <= egreso)
              AND convenio LIKE CONCAT('%', ?, '%')
              AND telefono IS NOT NULL
            ORDER BY apellido, nombre
            "#,
        )
        .bind(&self.eligible_agreement)
        .fetch_all(&self.pool)
        .await
        .context("failed to list eligible employees")?;

        debug!(count = rows.len(), "Eligible employees loaded");
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_by_dni(&self, dni: &str) -> Result<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT dni, nombre, apellido, telefono
            FROM nomina
            WHERE dni = ?
            "#,
        )
        .bind(dni)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load employee {dni}"))?;

        Ok(row.map(Employee::from))
    }
}

#[async_trait]
impl AttendanceStore for MySqlDataStore {
    #[instrument(skip(self, window), fields(from = %window.from, until = %window.until))]
    async fn get_records(&self, dni: &str, window: &AttendanceWindow) -> Result<Vec<AttendanceRecord>> {
        // First and last access of each day, with the device used for each.
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            WITH ranked_access AS (
                SELECT
                    id_empleado,
                    fecha_acceso,
                    hora_acceso,
                    nombre_dispositivo,
                    ROW_NUMBER() OVER (PARTITION BY id_empleado, fecha_acceso ORDER BY hora_acceso ASC) AS rn_primera,
                    ROW_NUMBER() OVER (PARTITION BY id_empleado, fecha_acceso ORDER BY hora_acceso DESC) AS rn_ultima
                FROM registros_acceso
                WHERE fecha_acceso >= ?
                  AND fecha_acceso < ?
                  AND id_empleado = ?
                  AND numero_serie_dispositivo <> ?
            )
            SELECT
                id_empleado,
                fecha_acceso,
                MAX(CASE WHEN rn_primera = 1 THEN hora_acceso END) AS primera_hora,
                MAX(CASE WHEN rn_primera = 1 THEN nombre_dispositivo END) AS dispositivo_entrada,
                MAX(CASE WHEN rn_ultima = 1 THEN hora_acceso END) AS ultima_hora,
                MAX(CASE WHEN rn_ultima = 1 THEN nombre_dispositivo END) AS dispositivo_salida
            FROM ranked_access
            WHERE rn_primera = 1 OR rn_ultima = 1
            GROUP BY id_empleado, fecha_acceso
            ORDER BY fecha_acceso ASC
            "#,
        )
        .bind(window.from)
        .bind(window.until)
        .bind(dni)
        .bind(&window.excluded_device_serial)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to load attendance records for {dni}"))?;

        debug!(count = rows.len(), "Attendance records loaded");
        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}
