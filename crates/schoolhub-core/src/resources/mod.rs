//! Typed read/write pairs for each REST resource.
//!
//! Each handle borrows the `SchoolClient` and pairs its reads (cached under
//! the keys in `keys`) with the writes that make those keys stale. Obtain
//! handles through the client, e.g. `client.students().list()`.

pub mod announcements;
pub mod attendance;
pub mod calendar;
pub mod director;
pub mod keys;
pub mod messages;
pub mod parents;
pub mod results;
pub mod school;
pub mod students;
pub mod teachers;

pub use announcements::Announcements;
pub use attendance::Attendance;
pub use calendar::Calendar;
pub use director::Director;
pub use messages::Messages;
pub use parents::Parents;
pub use results::Results;
pub use school::{GradeLevels, Sections, Subjects};
pub use students::Students;
pub use teachers::Teachers;

use crate::models::Role;

/// Roles that manage school records
pub(crate) const STAFF: &[Role] = &[Role::Director, Role::Teacher];

pub(crate) const DIRECTOR_ONLY: &[Role] = &[Role::Director];
