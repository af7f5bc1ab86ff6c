//! Data models for SchoolHub entities.
//!
//! Records are mirrored from the API as-is; the client owns no invariants
//! beyond field typing. This module contains:
//!
//! - `User`, `Role`: account identity
//! - `Student`, `Parent`, `Teacher`: role-specific records wrapping a `User`
//! - `GradeLevel`, `Subject`, `Section`: grouping entities
//! - `Announcement`, `CalendarEvent`, `Message`: authored content
//! - `ScoreRecord`, `CollectiveResult`, `AttendanceRecord`: assessment data
//! - `*Input` types: create/update payloads

pub mod content;
pub mod people;
pub mod results;
pub mod school;
pub mod user;

pub use content::{Announcement, AnnouncementInput, CalendarEvent, CalendarEventInput, Message, MessageInput};
pub use people::{Parent, ParentInput, PersonInput, Student, StudentInput, Teacher, TeacherInput};
pub use results::{
    AttendanceEntry, AttendanceInput, AttendanceRecord, AttendanceStatus, CollectiveResult, ScoreInput,
    ScoreRecord,
};
pub use school::{DirectorOverview, GradeLevel, GradeLevelInput, Section, SectionInput, Subject, SubjectInput};
pub use user::{Role, User};
