//! Command-line spec parser
//!
//! A spec is one of:
//! - an `http://` or `https://` URL, taken verbatim
//! - a path containing a separator, which must exist on disk
//! - `NAME`, or `NAME OP VERSION` with `OP` one of `==`, `=`, `>=`, `>`, `<=`, `<`

use std::path::{Path, PathBuf, is_separator};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::ClientError;
use crate::spec::types::{Constraint, NameSpec, Operator, Spec, Term};
use crate::version::semver::SemVer;

/// The name group is lazy, so the first recognized operator token splits the
/// string. Alternation order keeps `==`, `>=` and `<=` from being read as a
/// one-character operator.
static NAME_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)(?:(==|=|>=|>|<=|<)(.*))?$").expect("valid name spec pattern")
});

/// Parse a raw spec, checking local paths against the filesystem
pub fn parse(raw: &str) -> Result<Spec, ClientError> {
    parse_with(raw, |path| path.exists())
}

/// Parse a raw spec using `exists` to decide whether a local path is present
pub fn parse_with<F>(raw: &str, exists: F) -> Result<Spec, ClientError>
where
    F: Fn(&Path) -> bool,
{
    if raw.starts_with("http://") || raw.starts_with("https://") {
        debug!("Spec '{}' is a remote url", raw);
        return Ok(Spec::Remote(raw.to_string()));
    }

    if raw.contains(is_separator) {
        let path = PathBuf::from(raw);
        if !exists(&path) {
            return Err(ClientError::ResourceNotFound(format!(
                "cannot find '{}'",
                raw
            )));
        }
        debug!("Spec '{}' is a local path", raw);
        return Ok(Spec::Local(path));
    }

    parse_name_spec(raw).map(Spec::Name)
}

/// Parse `NAME (OP VERSION)?` without any filesystem lookup
pub fn parse_name_spec(raw: &str) -> Result<NameSpec, ClientError> {
    let bad_format = |reason: String| ClientError::BadSpecFormat {
        spec: raw.to_string(),
        reason,
    };

    let caps = NAME_SPEC
        .captures(raw)
        .ok_or_else(|| bad_format("expected NAME or NAME OP VERSION".to_string()))?;

    let name = Term::new(&caps[1]);

    let constraint = match (caps.get(2), caps.get(3)) {
        (Some(op), Some(version)) => {
            let operator = op
                .as_str()
                .parse::<Operator>()
                .map_err(|_| bad_format(format!("unknown operator '{}'", op.as_str())))?;
            let version = SemVer::clean(version.as_str()).map_err(|e| bad_format(e.to_string()))?;
            Some(Constraint { operator, version })
        }
        _ => None,
    };

    Ok(NameSpec { name, constraint })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn v(s: &str) -> SemVer {
        SemVer::clean(s).unwrap()
    }

    #[rstest]
    #[case("http://api.pgxn.org/dist/foobar/0.42.1/foobar-0.42.1.zip")]
    #[case("https://example.com/foo.zip")]
    #[case("https://example.com/foo>=1.0")]
    fn urls_are_remote_specs(#[case] raw: &str) {
        let spec = parse_with(raw, |_| panic!("no filesystem lookup for urls")).unwrap();
        assert_eq!(spec, Spec::Remote(raw.to_string()));
    }

    #[test]
    fn existing_directory_is_local_spec() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().to_str().unwrap();

        assert_eq!(parse(raw).unwrap(), Spec::Local(dir.path().to_path_buf()));
    }

    #[test]
    fn existing_file_is_local_spec() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("foobar-0.42.1.zip");
        std::fs::write(&file, b"zip").unwrap();

        let spec = parse(file.to_str().unwrap()).unwrap();
        assert_eq!(spec, Spec::Local(file));
    }

    #[test]
    fn missing_path_is_resource_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let err = parse(missing.to_str().unwrap()).unwrap_err();
        assert!(
            matches!(err, ClientError::ResourceNotFound(ref m) if m.contains("nope")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn bare_name_accepts_any_version() {
        let spec = parse_name_spec("foo").unwrap();
        assert_eq!(spec, NameSpec::any("foo"));
        assert!(spec.accepted(&v("0.0.1")));
    }

    #[rstest]
    #[case("foo=1.2", "foo", Operator::Eq, "1.2.0")]
    #[case("foo==1.2", "foo", Operator::Eq, "1.2.0")]
    #[case("foo>=1.1", "foo", Operator::Ge, "1.1.0")]
    #[case("foo>1.1", "foo", Operator::Gt, "1.1.0")]
    #[case("foo<=2", "foo", Operator::Le, "2.0.0")]
    #[case("foo<2.0.1", "foo", Operator::Lt, "2.0.1")]
    #[case("foobar==0.43.2b1", "foobar", Operator::Eq, "0.43.2b1")]
    #[case("Pair>=0.1", "pair", Operator::Ge, "0.1.0")]
    #[case("pg_partman4>=4.0", "pg_partman4", Operator::Ge, "4.0.0")]
    fn name_op_version_is_split(
        #[case] raw: &str,
        #[case] name: &str,
        #[case] operator: Operator,
        #[case] version: &str,
    ) {
        let spec = parse_name_spec(raw).unwrap();
        assert_eq!(spec.name.as_str(), name);
        assert_eq!(spec.operator(), Some(operator));
        assert_eq!(spec.version(), Some(&v(version)));
    }

    #[test]
    fn ge_constraint_accepts_boundary_and_above() {
        let spec = parse_name_spec("foo>=1.1").unwrap();
        assert!(spec.accepted(&v("1.1.0")));
        assert!(spec.accepted(&v("1.2.0")));
        assert!(!spec.accepted(&v("1.0.9")));
    }

    #[rstest]
    #[case("")]
    #[case("foo>=")]
    #[case("foo==bar")]
    #[case("foo<>1.0")]
    #[case("foo>=1.23-")]
    #[case("foo==12-")]
    fn malformed_specs_are_bad_format(#[case] raw: &str) {
        let err = parse_with(raw, |_| false).unwrap_err();
        assert!(
            matches!(err, ClientError::BadSpecFormat { ref spec, .. } if spec == raw),
            "unexpected error for '{raw}': {err:?}"
        );
    }

    #[test]
    fn operator_split_takes_first_operator_token() {
        // The lazy name group stops at the first operator character, even when
        // a longer split would also read as a valid spec.
        let err = parse_name_spec("a=b==1.0").unwrap_err();
        assert!(matches!(err, ClientError::BadSpecFormat { .. }));
    }

    #[test]
    fn leading_operator_becomes_part_of_name() {
        let spec = parse_name_spec("=1.0").unwrap();
        assert_eq!(spec.name.as_str(), "=1.0");
        assert_eq!(spec.constraint, None);
    }
}
