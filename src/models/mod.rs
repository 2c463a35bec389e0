// Events and comments as stored and as exchanged over HTTP
pub mod event;

pub use event::{
    Comment, Event, EventList, EventUpdate, LikeRequest, NewComment, NewEvent, UpdateOutcome,
    UpdateResult,
};
