//! Best release selection
//!
//! Tiers gate visibility only. Every release in a visible tier is a candidate,
//! and the highest version accepted by the spec wins regardless of which tier
//! it came from. Equal versions spelled differently (`1.2`, `1.2.0`) go to the
//! most stable tier, then to the first listed.

use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ClientError;
use crate::spec::types::NameSpec;
use crate::version::catalog::{Release, ReleaseCatalog};
use crate::version::semver::SemVer;
use crate::version::status::Status;

/// Pick the release of `catalog` that best satisfies `spec`.
///
/// # Arguments
/// * `catalog` - Releases of the distribution grouped by tier
/// * `spec` - Name spec whose constraint candidates must satisfy
/// * `status` - Least stable tier the caller accepts
///
/// # Returns
/// * `Ok(&Release)` - The accepted release with the highest version
/// * `Err(ClientError::ResourceNotFound)` - If no visible release is accepted
pub fn best_release<'a>(
    catalog: &'a ReleaseCatalog,
    spec: &NameSpec,
    status: Status,
) -> Result<&'a Release, ClientError> {
    for tier in catalog.releases.keys() {
        if Status::from_str(tier).is_err() {
            debug!("Skipping unknown release tier '{}' of {}", tier, spec.name);
        }
    }

    // Most stable tier first; among equal versions the first one seen wins.
    let best = Status::ALL
        .into_iter()
        .rev()
        .filter(|tier| tier.visible_at(status))
        .filter_map(|tier| catalog.releases.get(tier.as_str()))
        .flat_map(|releases| releases.iter())
        .filter_map(|release| match SemVer::clean(&release.version) {
            Ok(version) => Some((version, release)),
            Err(e) => {
                warn!("Ignoring release of {}: {}", spec.name, e);
                None
            }
        })
        .filter(|(version, _)| spec.accepted(version))
        .fold(None::<(SemVer, &Release)>, |best, candidate| match best {
            Some(best) if best.0 >= candidate.0 => Some(best),
            _ => Some(candidate),
        })
        .map(|(_, release)| release);

    match best {
        Some(release) => {
            debug!("Best version for {} is {}", spec, release.version);
            Ok(release)
        }
        None => Err(ClientError::ResourceNotFound(format!(
            "no suitable version found for {}",
            spec
        ))),
    }
}

/// Resolve the best version of `catalog` satisfying `spec` within `status`
pub fn resolve(
    catalog: &ReleaseCatalog,
    spec: &NameSpec,
    status: Status,
) -> Result<SemVer, ClientError> {
    let release = best_release(catalog, spec, status)?;
    SemVer::clean(&release.version)
        .map_err(|e| ClientError::ResourceNotFound(format!("{} for {}", e, spec)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parser::parse_name_spec;
    use rstest::rstest;

    fn three_tiers() -> ReleaseCatalog {
        ReleaseCatalog::from_tiers(&[
            ("stable", vec!["1.1.0", "1.2.0"]),
            ("testing", vec!["1.3.0"]),
            ("unstable", vec!["1.4.0"]),
        ])
    }

    #[rstest]
    #[case("foo", vec![("stable", vec!["1.2.0"])], "1.2.0")]
    #[case("foo", vec![("stable", vec!["1.2.0", "1.2.0b"])], "1.2.0")]
    #[case("foo=1.2", vec![("stable", vec!["1.2.0"])], "1.2.0")]
    #[case("foo>=1.1", vec![("stable", vec!["1.1.0", "1.2.0"])], "1.2.0")]
    #[case("foo<1.2", vec![("stable", vec!["1.1.0", "1.2.0"])], "1.1.0")]
    #[case("foo<=1.2", vec![("stable", vec!["1.1.0", "1.2.0", "1.3.0"])], "1.2.0")]
    #[case("foo>1.1", vec![("stable", vec!["1.2.0", "1.1.0", "1.1.5"])], "1.2.0")]
    fn resolve_picks_highest_accepted_stable_version(
        #[case] spec: &str,
        #[case] tiers: Vec<(&str, Vec<&str>)>,
        #[case] expected: &str,
    ) {
        let catalog = ReleaseCatalog::from_tiers(&tiers);
        let spec = parse_name_spec(spec).unwrap();

        assert_eq!(
            resolve(&catalog, &spec, Status::Stable).unwrap(),
            SemVer::clean(expected).unwrap()
        );
    }

    #[rstest]
    #[case(Status::Stable, "1.2.0")]
    #[case(Status::Testing, "1.3.0")]
    #[case(Status::Unstable, "1.4.0")]
    fn resolve_only_sees_tiers_at_requested_stability(
        #[case] status: Status,
        #[case] expected: &str,
    ) {
        let spec = parse_name_spec("foo>=1.1").unwrap();

        assert_eq!(
            resolve(&three_tiers(), &spec, status).unwrap(),
            SemVer::clean(expected).unwrap()
        );
    }

    #[rstest]
    #[case("foo>=1.3", vec![("stable", vec!["1.2.0"])])]
    #[case("foo>=1.3", vec![("stable", vec!["1.2.0"]), ("testing", vec!["1.3.0"])])]
    #[case("foo", vec![("testing", vec!["1.3.0"])])]
    #[case("foo", vec![])]
    fn resolve_fails_when_nothing_visible_matches(
        #[case] spec: &str,
        #[case] tiers: Vec<(&str, Vec<&str>)>,
    ) {
        let catalog = ReleaseCatalog::from_tiers(&tiers);
        let spec = parse_name_spec(spec).unwrap();

        let err = resolve(&catalog, &spec, Status::Stable).unwrap_err();
        assert!(
            matches!(err, ClientError::ResourceNotFound(ref m) if m.contains("foo")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn lower_stable_version_does_not_beat_higher_testing_version() {
        let catalog = ReleaseCatalog::from_tiers(&[
            ("stable", vec!["2.0.0"]),
            ("testing", vec!["2.1.0b1"]),
        ]);
        let spec = parse_name_spec("foo").unwrap();

        assert_eq!(
            resolve(&catalog, &spec, Status::Testing).unwrap(),
            SemVer::clean("2.1.0b1").unwrap()
        );
    }

    #[test]
    fn final_release_beats_its_prerelease_across_tiers() {
        let catalog = ReleaseCatalog::from_tiers(&[
            ("stable", vec!["0.42.1"]),
            ("testing", vec!["0.43.2b1"]),
            ("unstable", vec!["0.43.2"]),
        ]);
        let spec = parse_name_spec("foobar").unwrap();

        assert_eq!(
            best_release(&catalog, &spec, Status::Testing)
                .unwrap()
                .version,
            "0.43.2b1"
        );
        assert_eq!(
            best_release(&catalog, &spec, Status::Unstable)
                .unwrap()
                .version,
            "0.43.2"
        );
    }

    #[test]
    fn duplicate_versions_across_tiers_resolve_to_that_version() {
        let catalog = ReleaseCatalog::from_tiers(&[
            ("stable", vec!["1.2.0"]),
            ("testing", vec!["1.2.0"]),
        ]);
        let spec = parse_name_spec("foo").unwrap();

        assert_eq!(
            resolve(&catalog, &spec, Status::Testing).unwrap(),
            SemVer::new(1, 2, 0)
        );
    }

    #[rstest]
    #[case(vec![("stable", vec!["1.2"]), ("testing", vec!["1.2.0"])], "1.2")]
    #[case(vec![("testing", vec!["1.2.0"]), ("stable", vec!["1.2"])], "1.2")]
    #[case(vec![("testing", vec!["1.2"]), ("stable", vec!["1.2.0"])], "1.2.0")]
    #[case(vec![("stable", vec!["v1.2.0", "1.2.0"])], "v1.2.0")]
    #[case(vec![("stable", vec!["1.2.0", "v1.2.0"])], "1.2.0")]
    fn equal_versions_resolve_to_most_stable_first_listed_release(
        #[case] tiers: Vec<(&str, Vec<&str>)>,
        #[case] expected: &str,
    ) {
        let spec = parse_name_spec("foo").unwrap();

        for _ in 0..50 {
            let catalog = ReleaseCatalog::from_tiers(&tiers);
            let release = best_release(&catalog, &spec, Status::Testing).unwrap();
            assert_eq!(release.version, expected);
        }
    }

    #[test]
    fn best_release_keeps_published_version_string() {
        let catalog = ReleaseCatalog::from_tiers(&[("testing", vec!["0.43.2b1"])]);
        let spec = parse_name_spec("foobar").unwrap();

        let release = best_release(&catalog, &spec, Status::Testing).unwrap();
        assert_eq!(release.version, "0.43.2b1");
    }

    #[test]
    fn unknown_tiers_and_bad_versions_are_skipped() {
        let catalog = ReleaseCatalog::from_tiers(&[
            ("stable", vec!["not-a-version", "1.0.0"]),
            ("nightly", vec!["9.0.0"]),
        ]);
        let spec = parse_name_spec("foo").unwrap();

        assert_eq!(
            resolve(&catalog, &spec, Status::Unstable).unwrap(),
            SemVer::new(1, 0, 0)
        );
    }
}
