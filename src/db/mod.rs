pub mod postgres;
pub mod records;
pub mod redis;

pub use postgres::create_pool;
pub use records::{
    CachedRecordStore, Collection, PgRecordStore, Record, RecordFilter, RecordStore,
    MAX_LOOKUP_LIMIT,
};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;
