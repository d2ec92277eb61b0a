use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_name: String,
    pub table_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub table_type: String,
    pub columns: Vec<ColumnDetail>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDetail {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub column_default: Option<String>,
    pub is_primary_key: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    pub column_name: String,
    pub foreign_table_name: String,
    /// None when the reference targets the parent's primary key implicitly
    pub foreign_column_name: Option<String>,
}

impl TableSchema {
    /// Plain-text description used as a retrievable schema snippet
    pub fn describe(&self) -> String {
        let mut out = format!("{} {}\nColumns:\n", capitalize(&self.table_type), self.table_name);

        for col in &self.columns {
            let mut notes = Vec::new();
            if col.is_primary_key {
                notes.push("primary key".to_string());
            }
            if !col.is_nullable {
                notes.push("not null".to_string());
            }
            if let Some(default) = &col.column_default {
                notes.push(format!("default {}", default));
            }

            let data_type = if col.data_type.is_empty() {
                "ANY"
            } else {
                col.data_type.as_str()
            };

            if notes.is_empty() {
                out.push_str(&format!("- {} {}\n", col.column_name, data_type));
            } else {
                out.push_str(&format!(
                    "- {} {} ({})\n",
                    col.column_name,
                    data_type,
                    notes.join(", ")
                ));
            }
        }

        if !self.foreign_keys.is_empty() {
            out.push_str("Foreign keys:\n");
            for fk in &self.foreign_keys {
                match &fk.foreign_column_name {
                    Some(col) => out.push_str(&format!(
                        "- {} -> {}.{}\n",
                        fk.column_name, fk.foreign_table_name, col
                    )),
                    None => out.push_str(&format!(
                        "- {} -> {}\n",
                        fk.column_name, fk.foreign_table_name
                    )),
                }
            }
        }

        out
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A stringified cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCell {
    pub value: String,
    pub is_null: bool,
}

impl ResultCell {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_null: false,
        }
    }

    pub fn null() -> Self {
        Self {
            value: "NULL".to_string(),
            is_null: true,
        }
    }
}

/// A row positionally aligned to the result's column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub cells: Vec<ResultCell>,
}

/// Every row a statement produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}
