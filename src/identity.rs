// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Reviewer identity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Who is looking at the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Draws and comments on frames.
    Coach,
    /// Watches the clip with the coach's annotations overlaid.
    Student,
}

impl Role {
    pub fn can_annotate(self) -> bool {
        matches!(self, Role::Coach)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coach" => Ok(Role::Coach),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role '{}', expected coach or student", other)),
        }
    }
}

/// Source of the current user's role.
pub trait Identity {
    fn current_user_role(&self) -> Role;
}

/// Identity fixed at launch.
pub struct StaticIdentity(pub Role);

impl Identity for StaticIdentity {
    fn current_user_role(&self) -> Role {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("coach".parse::<Role>(), Ok(Role::Coach));
        assert_eq!("Student".parse::<Role>(), Ok(Role::Student));
        assert!("umpire".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_coach_annotates() {
        assert!(StaticIdentity(Role::Coach).current_user_role().can_annotate());
        assert!(!StaticIdentity(Role::Student).current_user_role().can_annotate());
    }
}
