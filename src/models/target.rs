//! Schedule targets and directory kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Kind of entity a schedule can be viewed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Group,
    Cabinet,
    Teacher,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Group => "group",
            TargetType::Cabinet => "cabinet",
            TargetType::Teacher => "teacher",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "group" => Ok(TargetType::Group),
            "cabinet" | "cab" => Ok(TargetType::Cabinet),
            "teacher" | "prepod" => Ok(TargetType::Teacher),
            other => Err(AppError::validation(format!(
                "Unknown target type '{other}'"
            ))),
        }
    }
}

/// The (type, name) pair whose schedule is being viewed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: TargetType,
    pub name: String,
}

impl Target {
    pub fn new(kind: TargetType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Key used in the schedule cache map: `"{type}:{name}"`.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// Backend enum for subscription types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackedType {
    Group,
    Cab,
    Prepod,
}

impl From<TargetType> for TrackedType {
    fn from(kind: TargetType) -> Self {
        match kind {
            TargetType::Group => TrackedType::Group,
            TargetType::Cabinet => TrackedType::Cab,
            TargetType::Teacher => TrackedType::Prepod,
        }
    }
}

/// One of the three name directories the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryKind {
    Groups,
    Teachers,
    Cabinets,
}

impl DirectoryKind {
    /// Endpoint path relative to the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            DirectoryKind::Groups => "groups",
            DirectoryKind::Teachers => "prepods",
            DirectoryKind::Cabinets => "cabs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DirectoryKind::Groups => "groups",
            DirectoryKind::Teachers => "teachers",
            DirectoryKind::Cabinets => "cabinets",
        }
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_format() {
        let target = Target::new(TargetType::Group, "ИС-21");
        assert_eq!(target.cache_key(), "group:ИС-21");
        assert_eq!(
            Target::new(TargetType::Teacher, "Иванов И.И.").cache_key(),
            "teacher:Иванов И.И."
        );
    }

    #[test]
    fn tracked_type_mapping() {
        assert_eq!(TrackedType::from(TargetType::Group), TrackedType::Group);
        assert_eq!(TrackedType::from(TargetType::Cabinet), TrackedType::Cab);
        assert_eq!(TrackedType::from(TargetType::Teacher), TrackedType::Prepod);
        assert_eq!(
            serde_json::to_string(&TrackedType::Prepod).unwrap(),
            "\"prepod\""
        );
    }

    #[test]
    fn parse_target_type() {
        assert_eq!("Group".parse::<TargetType>().unwrap(), TargetType::Group);
        assert_eq!("cab".parse::<TargetType>().unwrap(), TargetType::Cabinet);
        assert!("room".parse::<TargetType>().is_err());
    }

    #[test]
    fn target_serializes_with_type_field() {
        let json = serde_json::to_value(Target::new(TargetType::Cabinet, "101")).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "cabinet", "name": "101" }));
    }
}
