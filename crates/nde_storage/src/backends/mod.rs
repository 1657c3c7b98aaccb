pub mod file;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStorage;
