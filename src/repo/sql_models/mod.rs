mod business_record;
pub use business_record::*;

mod child_records;
pub use child_records::*;

mod pg_queries;
pub use pg_queries::*;
