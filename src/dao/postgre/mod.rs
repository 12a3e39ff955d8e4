use sqlx::{
    postgres::{PgPoolOptions, PgQueryResult},
    PgPool,
};

pub use self::migration::{get_path, migration_files};

mod migration;
mod subscription;

pub type PoolType = PgPool;
pub type PoolOption = PgPoolOptions;
pub type QueryResult = PgQueryResult;
