pub mod catalog;
pub mod clock;
pub mod config;
pub mod conversation;
pub mod profile;
pub mod responder;

// Re-export main types for convenience
pub use catalog::{Catalog, Difficulty, EventKind, ScheduleEvent, Subject, Video, VideoDetails};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, Preference, Preferences};
pub use conversation::{ChatMessage, ChatRole, Conversation};
pub use profile::{Grade, Language, ProfileError, StudentProfile};
pub use responder::{respond, Reply};
