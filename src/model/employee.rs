use serde::{Deserialize, Serialize};

/// An employee as seen by the notification pipeline.
///
/// `telefono` is the raw contact string from the payroll table (digits and
/// spaces); it is normalized right before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub dni: String,
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
}

impl Employee {
    /// First template variable: `"<apellido> <nombre> - DNI: <dni>"`.
    pub fn report_header(&self) -> String {
        format!("{} {} - DNI: {}", self.apellido, self.nombre, self.dni)
    }
}
