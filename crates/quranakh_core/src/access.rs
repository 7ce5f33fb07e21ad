//! crates/quranakh_core/src/access.rs
//!
//! School roles and who may read or mark a student's work.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }

    /// Owners, admins and teachers run the school.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Owner | Role::Admin | Role::Teacher)
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            other => Err(AccessError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's profile row: who they are and which school they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub school_id: Option<Uuid>,
}

impl Profile {
    fn same_school(&self, other: &Profile) -> bool {
        self.school_id.is_some() && self.school_id == other.school_id
    }
}

/// Whether `actor` may create, resolve or delete highlights and save sketches.
pub fn can_mark(actor: &Profile) -> bool {
    actor.role.is_staff()
}

/// Whether `actor` may mark this particular student.
pub fn can_mark_student(actor: &Profile, student: &Profile) -> bool {
    can_mark(actor) && actor.same_school(student)
}

/// Whether `actor` may read `student`'s highlights, progress and sketches.
///
/// `is_parent` is the caller-supplied parent/student link for parent actors.
pub fn can_view_student(actor: &Profile, student: &Profile, is_parent: bool) -> bool {
    match actor.role {
        Role::Owner | Role::Admin | Role::Teacher => actor.same_school(student),
        Role::Student => actor.id == student.id,
        Role::Parent => is_parent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: u128, role: Role, school: Option<u128>) -> Profile {
        Profile {
            id: Uuid::from_u128(id),
            role,
            school_id: school.map(Uuid::from_u128),
        }
    }

    #[test]
    fn staff_mark_students_in_their_school() {
        let student = profile(1, Role::Student, Some(10));
        for role in [Role::Owner, Role::Admin, Role::Teacher] {
            assert!(can_mark_student(&profile(2, role, Some(10)), &student));
            assert!(!can_mark_student(&profile(2, role, Some(11)), &student));
        }
        assert!(!can_mark_student(&profile(3, Role::Parent, Some(10)), &student));
    }

    #[test]
    fn missing_school_never_matches() {
        let student = profile(1, Role::Student, None);
        assert!(!can_view_student(&profile(2, Role::Teacher, None), &student, false));
    }

    #[test]
    fn students_and_parents_see_only_their_own() {
        let student = profile(1, Role::Student, Some(10));
        let classmate = profile(4, Role::Student, Some(10));
        let parent = profile(5, Role::Parent, Some(10));

        assert!(can_view_student(&student, &student, false));
        assert!(!can_view_student(&classmate, &student, false));
        assert!(can_view_student(&parent, &student, true));
        assert!(!can_view_student(&parent, &student, false));
    }

    #[test]
    fn roles_parse_from_profile_strings() {
        assert_eq!("teacher".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!(
            "principal".parse::<Role>(),
            Err(AccessError::UnknownRole("principal".to_string()))
        );
        assert_eq!(
            AccessError::UnknownRole("principal".to_string()).to_string(),
            "Unknown role: principal"
        );
    }
}
