// Bundled type mappers for common third-party types

pub mod mongo;

pub use self::mongo::MongoMapper;
