//! The post-crawl resolution pass.
//!
//! Runs exactly once, after the crawl stream has closed successfully. Turns
//! the URL-keyed transient membership descriptors into ID-keyed,
//! bidirectional edges, propagates `current` flags from parent groups into
//! sub-units, and fixes the output order. Records are never mutated again
//! after this pass.

use std::collections::HashMap;

use kpopnet_core::{Group, GroupMember, Idol, MembershipRef};

use crate::{Error, Result};

/// An idol together with its side-channel membership descriptors, as
/// accumulated during the streaming phase.
pub struct PendingIdol {
  pub idol:        Idol,
  pub memberships: Vec<MembershipRef>,
}

fn group_key(group: &Group) -> (&str, &str) {
  (group.debut_date.as_deref().unwrap_or("0"), &group.name)
}

/// Groups are looked up by source page URL, never by name: names are not
/// stable across renames and the site reuses them.
fn source_url(group: &Group) -> &str {
  group.urls.get(1).map_or("", String::as_str)
}

pub fn resolve(
  mut pending: Vec<PendingIdol>,
  mut groups: Vec<Group>,
) -> Result<(Vec<Idol>, Vec<Group>)> {
  // Most-recent first; this ordering is both the output order and the
  // basis for each idol's group list order.
  pending.sort_by(|a, b| {
    (&b.idol.birth_date, &b.idol.real_name)
      .cmp(&(&a.idol.birth_date, &a.idol.real_name))
  });
  groups.sort_by(|a, b| group_key(b).cmp(&group_key(a)));

  let by_url: HashMap<String, usize> = groups
    .iter()
    .enumerate()
    .map(|(i, g)| (source_url(g).to_string(), i))
    .collect();
  let sort_key_of: HashMap<String, (String, String)> = groups
    .iter()
    .map(|g| {
      let (date, name) = group_key(g);
      (g.id.clone(), (date.to_string(), name.to_string()))
    })
    .collect();

  for group in &mut groups {
    group.members = Vec::new();
  }

  let mut idols = Vec::with_capacity(pending.len());
  for PendingIdol { mut idol, memberships } in pending {
    for membership in memberships {
      let index = *by_url.get(&membership.group_url).ok_or_else(|| {
        Error::DanglingGroupRef { url: membership.group_url.clone() }
      })?;
      idol.groups.push(groups[index].id.clone());
      groups[index].members.push(GroupMember {
        idol_id: idol.id.clone(),
        current: membership.current,
        roles:   membership.roles,
      });
    }
    idol
      .groups
      .sort_by(|a, b| sort_key_of[b].cmp(&sort_key_of[a]));
    idols.push(idol);
  }

  propagate_current(&mut groups, &by_url)?;

  Ok((idols, groups))
}

/// Sub-unit pass: rewrite `parent_id` from page URL to the parent's final
/// id, and overwrite each sub-unit member's `current` flag with the
/// parent's, since sub-unit pages do not reliably report it themselves.
fn propagate_current(
  groups: &mut [Group],
  by_url: &HashMap<String, usize>,
) -> Result<()> {
  for index in 0..groups.len() {
    let Some(parent_url) = groups[index].parent_id.clone() else {
      continue;
    };
    let parent = *by_url
      .get(&parent_url)
      .ok_or_else(|| Error::DanglingGroupRef { url: parent_url.clone() })?;

    let parent_current: HashMap<String, bool> = groups[parent]
      .members
      .iter()
      .map(|m| (m.idol_id.clone(), m.current))
      .collect();
    let parent_id = groups[parent].id.clone();

    let subunit = &mut groups[index];
    subunit.parent_id = Some(parent_id);
    for member in &mut subunit.members {
      let current =
        parent_current.get(&member.idol_id).copied().ok_or_else(|| {
          Error::MemberNotInParent {
            idol_id: member.idol_id.clone(),
            group:   subunit.name.clone(),
          }
        })?;
      member.current = current;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use serde_json::{Map, Value, json};

  use kpopnet_core::{RecordKind, schema};

  use super::*;

  fn fields_of(value: Value) -> Map<String, Value> {
    let Value::Object(map) = value else { unreachable!() };
    map
  }

  fn idol(
    name: &str,
    original: &str,
    birth_date: &str,
    memberships: Vec<MembershipRef>,
  ) -> PendingIdol {
    let mut fields = fields_of(json!({
      "name": name,
      "name_original": original,
      "real_name": name,
      "real_name_original": original,
      "birth_date": birth_date,
      "urls": [format!("https://selca.kastden.org/noona/idol/{name}")],
    }));
    schema::normalize(RecordKind::Idol, &mut fields, &[]).unwrap();
    PendingIdol { idol: schema::finish(fields).unwrap(), memberships }
  }

  fn group(
    name: &str,
    original: &str,
    debut_date: Option<&str>,
    url: &str,
    parent_url: Option<&str>,
  ) -> Group {
    let mut fields = fields_of(json!({
      "name": name,
      "name_original": original,
      "agency_name": "Agency",
      "urls": [url],
    }));
    if let Some(date) = debut_date {
      fields.insert("debut_date".to_string(), json!(date));
    }
    if let Some(parent) = parent_url {
      fields.insert("parent_id".to_string(), json!(parent));
    }
    schema::normalize(RecordKind::Group, &mut fields, &[]).unwrap();
    schema::finish(fields).unwrap()
  }

  fn member(group_url: &str, current: bool) -> MembershipRef {
    MembershipRef {
      group_url: group_url.to_string(),
      current,
      roles: None,
    }
  }

  const TARA: &str = "https://selca.kastden.org/noona/group/tara";
  const QBS: &str = "https://selca.kastden.org/noona/group/qbs";

  #[test]
  fn edges_are_bidirectional() {
    let groups = vec![group("T-ara", "티아라", Some("2009-07-29"), TARA, None)];
    let pending = vec![
      idol("Boram", "보람", "1986-03-22", vec![member(TARA, false)]),
      idol("Qri", "큐리", "1986-12-12", vec![member(TARA, true)]),
    ];

    let (idols, groups) = resolve(pending, groups).unwrap();

    let group = &groups[0];
    assert_eq!(group.members.len(), 2);
    for idol in &idols {
      assert_eq!(idol.groups, vec![group.id.clone()]);
      assert!(
        group.members.iter().any(|m| m.idol_id == idol.id),
        "every idol edge has its reciprocal member entry"
      );
    }
  }

  #[test]
  fn output_is_sorted_most_recent_first() {
    let groups = vec![
      group("Old", "올드", Some("2009-01-01"), TARA, None),
      group("New", "뉴", Some("2020-01-01"), QBS, None),
    ];
    let pending = vec![
      idol("Elder", "엘더", "1986-03-22", vec![]),
      idol("Younger", "영거", "1999-05-05", vec![]),
    ];

    let (idols, groups) = resolve(pending, groups).unwrap();
    assert_eq!(idols[0].name, "Younger");
    assert_eq!(idols[1].name, "Elder");
    assert_eq!(groups[0].name, "New");
    assert_eq!(groups[1].name, "Old");
  }

  #[test]
  fn idol_group_list_mirrors_group_recency() {
    let groups = vec![
      group("Old", "올드", Some("2009-01-01"), TARA, None),
      group("New", "뉴", Some("2020-01-01"), QBS, None),
    ];
    // Discovered oldest-first on the page; the list must still come out
    // newest-first.
    let pending = vec![idol(
      "Boram",
      "보람",
      "1986-03-22",
      vec![member(TARA, true), member(QBS, true)],
    )];

    let (idols, groups) = resolve(pending, groups).unwrap();
    assert_eq!(idols[0].groups, vec![groups[0].id.clone(), groups[1].id.clone()]);
    assert_eq!(groups[0].name, "New");
  }

  #[test]
  fn missing_group_reference_is_fatal() {
    let pending = vec![idol(
      "Boram",
      "보람",
      "1986-03-22",
      vec![member("https://selca.kastden.org/noona/group/nope", true)],
    )];
    assert!(matches!(
      resolve(pending, Vec::new()),
      Err(Error::DanglingGroupRef { .. })
    ));
  }

  #[test]
  fn subunit_current_flags_follow_the_parent() {
    let groups = vec![
      group("T-ara", "티아라", Some("2009-07-29"), TARA, None),
      group("QBS", "큐비에스", Some("2013-06-00"), QBS, Some(TARA)),
    ];
    // Left T-ara, but the sub-unit page still says current.
    let pending = vec![idol(
      "Boram",
      "보람",
      "1986-03-22",
      vec![member(TARA, false), member(QBS, true)],
    )];

    let (idols, groups) = resolve(pending, groups).unwrap();
    let parent = groups.iter().find(|g| g.name == "T-ara").unwrap();
    let subunit = groups.iter().find(|g| g.name == "QBS").unwrap();

    assert_eq!(subunit.parent_id.as_deref(), Some(parent.id.as_str()));
    assert!(!subunit.members[0].current, "parent flag wins");
    assert_eq!(idols[0].groups.len(), 2);
  }

  #[test]
  fn subunit_member_missing_from_parent_is_fatal() {
    let groups = vec![
      group("T-ara", "티아라", Some("2009-07-29"), TARA, None),
      group("QBS", "큐비에스", Some("2013-06-00"), QBS, Some(TARA)),
    ];
    // In the sub-unit but not in the parent: inconsistent source data.
    let pending = vec![idol(
      "Boram",
      "보람",
      "1986-03-22",
      vec![member(QBS, true)],
    )];
    assert!(matches!(
      resolve(pending, groups),
      Err(Error::MemberNotInParent { .. })
    ));
  }

  #[test]
  fn unknown_parent_url_is_fatal() {
    let groups = vec![group(
      "QBS",
      "큐비에스",
      Some("2013-06-00"),
      QBS,
      Some("https://selca.kastden.org/noona/group/gone"),
    )];
    assert!(matches!(
      resolve(Vec::new(), groups),
      Err(Error::DanglingGroupRef { .. })
    ));
  }
}
