pub mod crew_members;
pub mod events;
pub mod participants;
pub mod registrations;
pub mod teams;

pub use crew_members::CrewMemberRow;
pub use events::{EventDetailsRow, EventRow};
pub use participants::ParticipantRow;
pub use registrations::UserEventNameRow;
pub use teams::{TeamRow, UserTeamRow};
