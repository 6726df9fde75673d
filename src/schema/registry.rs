use serde::Serialize;

use crate::error::{AppError, Result};

/// One table of a preset schema, as shown in the selection sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableBreakdown {
    pub table_name: String,
    pub attributes: Vec<String>,
}

impl TableBreakdown {
    pub fn new(table_name: &str, attributes: &[&str]) -> Self {
        Self {
            table_name: table_name.to_string(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// A selectable database identity and the schema text fed to the model.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescriptor {
    pub id: u32,
    pub db_name: String,
    pub display_name: String,
    pub schema_text: String,
    pub table_breakdown: Vec<TableBreakdown>,
}

impl SchemaDescriptor {
    /// Builds a descriptor whose schema text is serialized from the tables,
    /// in the `TABLE: attr; attr//TABLE2: ...` form the model was trained on.
    pub fn new(id: u32, db_name: &str, display_name: &str, tables: Vec<TableBreakdown>) -> Self {
        let schema_text = tables
            .iter()
            .map(|t| format!("{}: {}", t.table_name, t.attributes.join("; ")))
            .collect::<Vec<_>>()
            .join("//");

        Self {
            id,
            db_name: db_name.to_string(),
            display_name: display_name.to_string(),
            schema_text,
            table_breakdown: tables,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSummary {
    pub id: u32,
    pub name: String,
}

/// Read-only, ordered set of preset schemas. Ids are unique.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<SchemaDescriptor>,
}

impl SchemaRegistry {
    pub fn new(schemas: Vec<SchemaDescriptor>) -> Result<Self> {
        for (i, schema) in schemas.iter().enumerate() {
            if schemas[..i].iter().any(|s| s.id == schema.id) {
                return Err(AppError::configuration(format!(
                    "Duplicate schema id {}",
                    schema.id
                )));
            }
        }
        Ok(Self { schemas })
    }

    /// Id and display name of every preset, for the selection UI.
    pub fn list(&self) -> Vec<SchemaSummary> {
        self.schemas
            .iter()
            .map(|s| SchemaSummary {
                id: s.id,
                name: s.display_name.clone(),
            })
            .collect()
    }

    pub fn get(&self, id: i64) -> Result<&SchemaDescriptor> {
        self.schemas
            .iter()
            .find(|s| i64::from(s.id) == id)
            .ok_or_else(|| AppError::not_found(format!("No preset schema with id {}", id)))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }
}
