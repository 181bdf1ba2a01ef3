mod record;
mod repository;


pub use record::EventRecord;
pub use repository::EventRepository;
