//! Visibility filtering applied to list results.

use std::collections::BTreeSet;

use super::{status, Record};

/// Filter a listing down to what the viewer may see.
///
/// Records whose slug is on the exclusion list are removed for every
/// viewer. Records whose status is not `published` are removed unless the
/// viewer is the maintainer. The function is pure and is applied the same
/// way to remote- and mirror-sourced listings, so the two viewer classes
/// see deterministically different but individually stable result sets.
pub fn visible<T: Record>(
  records: Vec<T>,
  hidden_slugs: &BTreeSet<String>,
  viewer_is_maintainer: bool,
) -> Vec<T> {
  records
    .into_iter()
    .filter(|record| !hidden_slugs.contains(&record.slug().to_lowercase()))
    .filter(|record| viewer_is_maintainer || record.status() == status::PUBLISHED)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::Post;
  use chrono::Utc;

  fn post(slug: &str, status: &str) -> Post {
    Post {
      id: format!("id-{}", slug),
      slug: slug.to_string(),
      title: slug.to_uppercase(),
      content: String::new(),
      excerpt: None,
      tags: Vec::new(),
      status: status.to_string(),
      featured: false,
      owner: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn slugs(records: &[Post]) -> Vec<&str> {
    records.iter().map(|r| r.slug.as_str()).collect()
  }

  #[test]
  fn test_public_viewer_sees_published_only() {
    let records = vec![post("a", status::PUBLISHED), post("b", status::DRAFT)];

    let result = visible(records, &BTreeSet::new(), false);
    assert_eq!(slugs(&result), ["a"]);
  }

  #[test]
  fn test_maintainer_sees_drafts() {
    let records = vec![post("a", status::PUBLISHED), post("b", status::DRAFT)];

    let result = visible(records, &BTreeSet::new(), true);
    assert_eq!(slugs(&result), ["a", "b"]);
  }

  #[test]
  fn test_excluded_slug_hidden_from_every_viewer() {
    let hidden: BTreeSet<String> = ["kt".to_string(), "fed".to_string()].into();
    let records = vec![post("kt", status::PUBLISHED), post("valid-post", status::PUBLISHED)];

    for maintainer in [false, true] {
      let result = visible(records.clone(), &hidden, maintainer);
      assert_eq!(slugs(&result), ["valid-post"]);
    }
  }

  #[test]
  fn test_exclusion_is_case_insensitive() {
    let hidden: BTreeSet<String> = ["kt".to_string()].into();
    let records = vec![post("KT", status::PUBLISHED)];

    let result = visible(records, &hidden, true);
    assert!(result.is_empty());
  }

  #[test]
  fn test_filter_is_deterministic() {
    let hidden: BTreeSet<String> = ["fed".to_string()].into();
    let records = vec![
      post("a", status::PUBLISHED),
      post("fed", status::PUBLISHED),
      post("b", status::DRAFT),
    ];

    let first = visible(records.clone(), &hidden, false);
    let second = visible(records, &hidden, false);
    assert_eq!(slugs(&first), slugs(&second));
  }

  #[test]
  fn test_unknown_status_treated_as_unpublished() {
    let records = vec![post("a", "archived")];

    assert!(visible(records.clone(), &BTreeSet::new(), false).is_empty());
    assert_eq!(visible(records, &BTreeSet::new(), true).len(), 1);
  }
}
