use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// Well-known workflow status tokens.
///
/// Statuses are compared by equality and otherwise treated as opaque, so
/// backend-defined values outside this list pass through unchanged.
pub mod status {
  pub const DRAFT: &str = "draft";
  pub const PUBLISHED: &str = "published";
}

fn default_status() -> String {
  status::DRAFT.to_string()
}

/// A blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub id: String,
  pub slug: String,
  pub title: String,
  pub content: String,
  #[serde(default)]
  pub excerpt: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  pub status: String,
  #[serde(default)]
  pub featured: bool,
  /// Identity stamped by the gateway on maintainer writes
  #[serde(default)]
  pub owner: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Creation input for a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
  pub slug: String,
  pub title: String,
  pub content: String,
  #[serde(default)]
  pub excerpt: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default = "default_status")]
  pub status: String,
  #[serde(default)]
  pub featured: bool,
}

/// Partial update for a post. Only set fields are transmitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub content: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub excerpt: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub featured: Option<bool>,
}

impl Record for Post {
  type Draft = NewPost;
  type Patch = PostPatch;

  fn id(&self) -> &str {
    &self.id
  }

  fn slug(&self) -> &str {
    &self.slug
  }

  fn title(&self) -> &str {
    &self.title
  }

  fn status(&self) -> &str {
    &self.status
  }

  fn collection() -> &'static str {
    "posts"
  }
}

/// A portfolio project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
  pub id: String,
  pub slug: String,
  pub title: String,
  pub description: String,
  /// Live deployment, if one exists
  #[serde(default)]
  pub link: Option<String>,
  /// Source repository
  #[serde(default)]
  pub repo: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  pub status: String,
  #[serde(default)]
  pub featured: bool,
  #[serde(default)]
  pub owner: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Creation input for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
  pub slug: String,
  pub title: String,
  pub description: String,
  #[serde(default)]
  pub link: Option<String>,
  #[serde(default)]
  pub repo: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default = "default_status")]
  pub status: String,
  #[serde(default)]
  pub featured: bool,
}

/// Partial update for a project. Only set fields are transmitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub link: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repo: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub featured: Option<bool>,
}

impl Record for Project {
  type Draft = NewProject;
  type Patch = ProjectPatch;

  fn id(&self) -> &str {
    &self.id
  }

  fn slug(&self) -> &str {
    &self.slug
  }

  fn title(&self) -> &str {
    &self.title
  }

  fn status(&self) -> &str {
    &self.status
  }

  fn collection() -> &'static str {
    "projects"
  }
}
