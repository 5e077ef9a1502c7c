//! Identifier quoting.
//!
//! Schema and table names cannot be bound as parameters, so they are
//! interpolated into statements after quoting. Values never are.

use cronstore_config::StoreSettings;

/// Quote an identifier, doubling any embedded double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Schema-qualified, quoted names of the store's tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub schema: String,
    pub jobs: String,
    pub logs: String,
    pub locks: String,
    /// Index on the logs table; lives in the table's schema.
    pub logs_index: String,
}

impl Tables {
    pub fn new(settings: &StoreSettings) -> Self {
        let qualified = |table: &str| format!("{}.{}", quote_ident(&settings.schema), quote_ident(table));

        Self {
            schema: quote_ident(&settings.schema),
            jobs: qualified(&settings.jobs_table),
            logs: qualified(&settings.logs_table),
            locks: qualified(&settings.locks_table),
            logs_index: quote_ident(&format!("{}_job_id_idx", settings.logs_table)),
        }
    }
}
