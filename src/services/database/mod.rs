mod manager;
mod query;
mod schema;
mod types;

pub use manager::DatabaseManager;

#[cfg(test)]
pub(crate) use manager::testing;

#[allow(unused_imports)]
pub use types::{
    ColumnDetail, ForeignKeyInfo, QueryOutput, ResultCell, ResultRow, TableInfo, TableSchema,
};
