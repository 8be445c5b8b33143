//! Parsed package specs

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::version::semver::SemVer;

/// Normalized package identifier.
///
/// Package names on the registry are case-insensitive, so a term is stored
/// trimmed and lowercased. Normalizing an existing term is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term(String);

impl Term {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comparison operator of a version constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Le,
    Lt,
    Ge,
    Gt,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Le => "<=",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Gt => ">",
        }
    }

    /// Compare `candidate` against `target`
    pub fn compare(&self, candidate: &SemVer, target: &SemVer) -> bool {
        match self {
            Operator::Eq => candidate == target,
            Operator::Le => candidate <= target,
            Operator::Lt => candidate < target,
            Operator::Ge => candidate >= target,
            Operator::Gt => candidate > target,
        }
    }
}

impl FromStr for Operator {
    type Err = ();

    /// `=` is accepted as a spelling of `==`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" | "=" => Ok(Operator::Eq),
            "<=" => Ok(Operator::Le),
            "<" => Ok(Operator::Lt),
            ">=" => Ok(Operator::Ge),
            ">" => Ok(Operator::Gt),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub operator: Operator,
    pub version: SemVer,
}

/// A package requested by name, optionally constrained to a version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSpec {
    pub name: Term,
    /// `None` accepts any version
    pub constraint: Option<Constraint>,
}

impl NameSpec {
    pub fn any(name: &str) -> Self {
        Self {
            name: Term::new(name),
            constraint: None,
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        self.constraint.as_ref().map(|c| c.operator)
    }

    pub fn version(&self) -> Option<&SemVer> {
        self.constraint.as_ref().map(|c| &c.version)
    }

    pub fn accepted(&self, version: &SemVer) -> bool {
        match &self.constraint {
            None => true,
            Some(c) => c.operator.compare(version, &c.version),
        }
    }
}

impl fmt::Display for NameSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            None => write!(f, "{}", self.name),
            Some(c) => write!(f, "{}{}{}", self.name, c.operator, c.version),
        }
    }
}

/// What a command-line spec refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spec {
    /// A release to look up on the registry
    Name(NameSpec),
    /// A file or directory already on disk
    Local(PathBuf),
    /// An archive fetched straight from an http(s) URL
    Remote(String),
}

impl Spec {
    /// Whether `version` satisfies this spec. Only name specs constrain versions.
    pub fn accepted(&self, version: &SemVer) -> bool {
        match self {
            Spec::Name(spec) => spec.accepted(version),
            Spec::Local(_) | Spec::Remote(_) => true,
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Spec::Local(path) => Some(path.as_path()),
            _ => None,
        }
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spec::Name(spec) => write!(f, "{}", spec),
            Spec::Local(path) => write!(f, "{}", path.display()),
            Spec::Remote(url) => f.write_str(url),
        }
    }
}
