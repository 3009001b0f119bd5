//! Table definitions.

/// Schema that holds every CoreSuit table.
pub const DEFAULT_SCHEMA: &str = "sc_001";

/// Where an entity is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfo {
    /// Table name.
    pub name: &'static str,
    /// Schema name.
    pub schema: &'static str,
    /// Table comment.
    pub description: &'static str,
}

impl TableInfo {
    /// Create a table definition.
    pub const fn new(name: &'static str, schema: &'static str, description: &'static str) -> Self {
        Self {
            name,
            schema,
            description,
        }
    }

    /// Quoted, schema-qualified name for use in SQL.
    pub fn qualified_name(&self) -> String {
        format!("\"{}\".\"{}\"", self.schema, self.name)
    }
}

/// Registry of tables created by the migrations.
pub mod tables {
    use super::{DEFAULT_SCHEMA, TableInfo};

    /// The example resource table.
    pub const EXAMPLE: TableInfo = TableInfo::new("example_table", DEFAULT_SCHEMA, "Example table.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        assert_eq!(tables::EXAMPLE.qualified_name(), "\"sc_001\".\"example_table\"");
    }
}
