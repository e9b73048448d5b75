//! Employee directory lookup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub employee_id: String,
    pub name: String,
    pub location: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

pub trait EmployeeDirectory: Send + Sync {
    fn lookup(&self, employee_id: &str) -> Option<Employee>;
}

/// Directory backed by a JSON file loaded at startup
pub struct JsonEmployeeDirectory {
    by_id: HashMap<String, Employee>,
}

impl JsonEmployeeDirectory {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let employees: Vec<Employee> = serde_json::from_str(&raw)?;
        Ok(Self::from_employees(employees))
    }

    pub fn from_employees(employees: Vec<Employee>) -> Self {
        let by_id = employees
            .into_iter()
            .map(|e| (e.employee_id.clone(), e))
            .collect();
        Self { by_id }
    }
}

impl EmployeeDirectory for JsonEmployeeDirectory {
    fn lookup(&self, employee_id: &str) -> Option<Employee> {
        self.by_id.get(employee_id).cloned()
    }
}
