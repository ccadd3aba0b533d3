//! End-to-end tests for attribute matching and variant selection.

use proptest::prelude::*;
use stratum_lib::attributes::{
  Attribute, AttributeMatcher, AttributeRegistration, AttributeSet, AttributeValue, MatchError, SchemaBuilder,
};
use stratum_lib::variant::{ComponentIdentifier, ResolutionError, Variant, VariantSelector};

use super::common::{api, arch, flavor, native_matcher, os, platform};

fn with_api(set: AttributeSet, version: &str) -> AttributeSet {
  set
    .merge(&AttributeSet::of([(api(), semver::Version::parse(version).unwrap())]).unwrap())
    .unwrap()
}

fn with_flavor(set: AttributeSet, value: &str) -> AttributeSet {
  set.merge(&AttributeSet::of([(flavor(), value)]).unwrap()).unwrap()
}

#[test]
fn exact_platform_wins() {
  let matcher = native_matcher();
  let candidates = vec![
    platform("linux", "x64"),
    platform("linux", "arm64"),
    platform("windows", "x64"),
  ];
  let selected = matcher
    .match_multiple_candidates(&candidates, &platform("linux", "x64"))
    .unwrap();
  assert_eq!(selected, vec![&candidates[0]]);
}

#[test]
fn candidate_lacking_requested_attribute_is_compatible() {
  let matcher = native_matcher();
  let os_only = AttributeSet::of([(os(), "linux")]).unwrap();
  assert!(matcher.is_matching_candidate(&os_only, &platform("linux", "x64")).unwrap());
}

#[test]
fn mandatory_attribute_must_be_present() {
  let schema = SchemaBuilder::new()
    .register(AttributeRegistration::new(os()).mandatory())
    .precedence([os()])
    .build()
    .unwrap();
  let matcher = AttributeMatcher::new(schema);
  let request = AttributeSet::of([(os(), "linux")]).unwrap();
  assert!(!matcher.is_matching_candidate(&AttributeSet::empty(), &request).unwrap());
}

#[test]
fn highest_version_breaks_ties() {
  let matcher = native_matcher();
  let candidates = vec![
    with_api(platform("linux", "x64"), "1.4.0"),
    with_api(platform("linux", "x64"), "2.0.0"),
    with_api(platform("linux", "x64"), "1.9.9"),
  ];
  let selected = matcher
    .match_multiple_candidates(&candidates, &platform("linux", "x64"))
    .unwrap();
  assert_eq!(selected, vec![&candidates[1]]);
}

#[test]
fn attribute_without_rule_leaves_ambiguity() {
  let matcher = native_matcher();
  let candidates = vec![
    with_flavor(platform("linux", "x64"), "debug"),
    with_flavor(platform("linux", "x64"), "release"),
  ];
  let selected = matcher
    .match_multiple_candidates(&candidates, &platform("linux", "x64"))
    .unwrap();
  assert_eq!(selected.len(), 2);
}

#[test]
fn no_compatible_candidate_is_an_empty_result() {
  let matcher = native_matcher();
  let candidates = vec![platform("windows", "x64")];
  let selected = matcher
    .match_multiple_candidates(&candidates, &platform("linux", "x64"))
    .unwrap();
  assert!(selected.is_empty());
}

#[test]
fn unregistered_request_attribute_fails_fast() {
  let matcher = native_matcher();
  let request = AttributeSet::of([(Attribute::string("libc"), "musl")]).unwrap();
  let err = matcher
    .match_multiple_candidates(&[platform("linux", "x64")], &request)
    .unwrap_err();
  assert!(matches!(err, MatchError::UnregisteredAttribute { name } if name == "libc"));
}

#[test]
fn mutual_compatibility_ignores_unshared_attributes() {
  let matcher = native_matcher();
  let a = with_flavor(AttributeSet::of([(os(), "linux")]).unwrap(), "debug");
  let b = platform("linux", "x64");
  assert!(matcher.are_mutually_compatible(&a, &b).unwrap());
  assert!(!matcher.are_mutually_compatible(&a, &platform("windows", "x64")).unwrap());
}

#[test]
fn describe_matching_covers_each_requested_attribute() {
  let matcher = native_matcher();
  let candidate = AttributeSet::of([(os(), "windows")]).unwrap();
  let descriptions = matcher.describe_matching(&candidate, &platform("linux", "x64"));
  assert_eq!(descriptions.len(), 2);
  assert!(descriptions.iter().all(|d| d.requested.attribute != flavor()));
  let os_description = descriptions.iter().find(|d| d.requested.attribute == os()).unwrap();
  assert!(!os_description.is_match);
  let arch_description = descriptions.iter().find(|d| d.requested.attribute == arch()).unwrap();
  assert!(arch_description.found.is_none());
}

#[test]
fn selector_reports_ambiguity_with_descriptions() {
  let selector = VariantSelector::new(native_matcher());
  let component = ComponentIdentifier::module("org.example", "native", "1.0");
  let candidates = vec![
    Variant::new(component.clone(), "debug", with_flavor(platform("linux", "x64"), "debug")),
    Variant::new(component, "release", with_flavor(platform("linux", "x64"), "release")),
  ];
  let err = selector.select(&candidates, &platform("linux", "x64")).unwrap_err();
  let ResolutionError::AmbiguousVariants { candidates: reports, .. } = &err else {
    panic!("expected ambiguity, got {err:?}");
  };
  assert_eq!(reports.len(), 2);
  assert!(reports.iter().all(|r| r.descriptions.iter().all(|d| d.is_match)));
  assert!(err.to_string().contains("variant 'release' of org.example:native:1.0"));
}

fn candidate() -> impl Strategy<Value = AttributeSet> {
  (
    prop::sample::select(vec!["linux", "windows"]),
    prop::sample::select(vec!["x64", "arm64"]),
    prop::option::of(prop::sample::select(vec!["1.0.0", "1.2.0", "2.0.0"])),
    prop::option::of(prop::sample::select(vec!["debug", "release"])),
  )
    .prop_map(|(os_value, arch_value, api_value, flavor_value)| {
      let mut set = platform(os_value, arch_value);
      if let Some(version) = api_value {
        set = with_api(set, version);
      }
      if let Some(value) = flavor_value {
        set = with_flavor(set, value);
      }
      set
    })
}

fn rendered(selected: Vec<&AttributeSet>) -> Vec<String> {
  let mut out: Vec<String> = selected.into_iter().map(|s| s.to_string()).collect();
  out.sort();
  out
}

proptest! {
  #[test]
  fn candidate_order_never_changes_the_result(
    (original, shuffled) in prop::collection::vec(candidate(), 0..8)
      .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
    request_arch in prop::option::of(prop::sample::select(vec!["x64", "arm64"])),
  ) {
    let matcher = native_matcher();
    let request = match request_arch {
      Some(value) => platform("linux", value),
      None => AttributeSet::of([(os(), "linux")]).unwrap(),
    };
    let a = matcher.match_multiple_candidates(&original, &request).unwrap();
    let b = matcher.match_multiple_candidates(&shuffled, &request).unwrap();
    prop_assert_eq!(rendered(a), rendered(b));
  }

  #[test]
  fn equality_rule_is_reflexive(value in ".*") {
    let matcher = native_matcher();
    let v = AttributeValue::from(value);
    prop_assert!(matcher.is_matching_value(&flavor(), &v, &v).unwrap());
  }
}
