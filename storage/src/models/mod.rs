mod message_record;
mod message_stats;

pub use message_record::MessageRecord;
pub use message_stats::MessageStats;
