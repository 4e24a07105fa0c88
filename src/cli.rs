//! CLI commands: thin consumers of the repository and the visibility
//! filter. Policy stays here - the repository itself never filters.

use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Config;
use crate::content::{status, visible, Post, Project, Record};
use crate::error::StoreError;
use crate::mirror::{MirrorStore, NoopMirror, SqliteMirror};
use crate::remote::{Identity, RecordGateway, RestGateway};
use crate::repo::{ListSource, Listing, Repository};

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Manage blog posts
  Posts {
    #[command(subcommand)]
    action: Action,
  },
  /// Manage portfolio projects
  Projects {
    #[command(subcommand)]
    action: Action,
  },
}

#[derive(Debug, Subcommand)]
pub enum Action {
  /// List records visible to the current viewer
  List {
    /// Include non-published records (maintainer sessions only)
    #[arg(long)]
    all: bool,
  },
  /// Show one record by id or slug
  Show { selector: String },
  /// Create a record from a YAML draft file
  Create { file: PathBuf },
  /// Apply a partial update from a YAML patch file
  Update { id: String, file: PathBuf },
  /// Set a record's status to published
  Publish { id: String },
  /// Delete a record by id
  Delete { id: String },
}

pub async fn run(command: Command, config: &Config) -> Result<()> {
  match command {
    Command::Posts { action } => run_entity::<Post>(action, config).await,
    Command::Projects { action } => run_entity::<Project>(action, config).await,
  }
}

async fn run_entity<T: Record>(action: Action, config: &Config) -> Result<()> {
  let gateway = build_gateway(config)?;

  if config.mirror.enabled {
    let mirror = match &config.mirror.path {
      Some(path) => SqliteMirror::open_at(path)?,
      None => SqliteMirror::open()?,
    };
    execute::<T, _, _>(action, config, gateway, mirror).await
  } else {
    execute::<T, _, _>(action, config, gateway, NoopMirror).await
  }
}

/// Build the REST gateway, or `None` when the backend is unconfigured.
///
/// Unconfigured means either no backend section in the config or no API
/// key in the environment; both leave the repository mirror-only.
fn build_gateway(config: &Config) -> Result<Option<RestGateway>> {
  let Some(backend) = &config.backend else {
    debug!("No backend section in config, running mirror-only");
    return Ok(None);
  };

  let Ok(api_key) = Config::get_api_key() else {
    warn!("Backend configured but FOLIO_API_KEY is not set, running mirror-only");
    return Ok(None);
  };

  let token = Config::get_service_token();
  Ok(Some(RestGateway::new(backend, api_key, token)?))
}

async fn execute<T, G, M>(
  action: Action,
  config: &Config,
  gateway: Option<G>,
  mirror: M,
) -> Result<()>
where
  T: Record,
  G: RecordGateway<T>,
  M: MirrorStore,
{
  let is_maintainer = Config::get_service_token().is_some();

  let mut repo = Repository::<T, G, M>::new(gateway, mirror);
  if is_maintainer {
    if let Some(subject) = config.backend.as_ref().and_then(|b| b.maintainer.clone()) {
      repo = repo.with_actor(Identity::new(subject));
    }
  }

  match action {
    Action::List { all } => {
      if all && !is_maintainer {
        warn!("--all requires a maintainer session (FOLIO_SERVICE_TOKEN), showing published only");
      }

      let listing = repo.list().await;
      print_source_note(&listing);

      let records = visible(
        listing.records,
        &config.content.hidden_slugs,
        all && is_maintainer,
      );
      for record in &records {
        println!(
          "{:<8} {:<28} {:<12} {}",
          record.id(),
          record.slug(),
          record.status(),
          record.title()
        );
      }
    }

    Action::Show { selector } => {
      let record = match repo.get(&selector).await {
        Ok(record) => record,
        // Not an id; fall back to a slug scan of the listing.
        Err(StoreError::NotFound(_)) => {
          let listing = repo.list().await;
          listing
            .records
            .into_iter()
            .find(|r| r.slug() == selector)
            .ok_or_else(|| eyre!("No record with id or slug '{}'", selector))?
        }
        Err(err) => return Err(err.into()),
      };
      print_record(&record)?;
    }

    Action::Create { file } => {
      let draft: T::Draft = read_yaml(&file)?;
      let record = repo.create(&draft).await?;
      println!("Created {} ({})", record.slug(), record.id());
    }

    Action::Update { id, file } => {
      let patch: T::Patch = read_yaml(&file)?;
      let record = repo.update(&id, &patch).await?;
      println!("Updated {} ({})", record.slug(), record.id());
    }

    Action::Publish { id } => {
      let patch: T::Patch =
        serde_json::from_value(serde_json::json!({ "status": status::PUBLISHED }))
          .map_err(|e| eyre!("Failed to build publish patch: {}", e))?;
      let record = repo.update(&id, &patch).await?;
      println!("Published {} ({})", record.slug(), record.id());
    }

    Action::Delete { id } => {
      if repo.delete(&id).await? {
        println!("Deleted {}", id);
      } else {
        println!("Nothing to delete: {} is already absent", id);
      }
    }
  }

  Ok(())
}

fn print_source_note<T>(listing: &Listing<T>) {
  match listing.source {
    ListSource::Remote => {}
    ListSource::Mirror => {
      let saved = listing
        .saved_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
      eprintln!("(backend unavailable: showing mirrored data from {})", saved);
    }
    ListSource::Unavailable => {
      eprintln!("(no backend reachable and no mirrored data)");
    }
  }
}

fn print_record<T: Record>(record: &T) -> Result<()> {
  let yaml =
    serde_yaml::to_string(record).map_err(|e| eyre!("Failed to render record: {}", e))?;
  println!("{}", yaml);
  Ok(())
}

fn read_yaml<D: serde::de::DeserializeOwned>(path: &Path) -> Result<D> {
  let contents = std::fs::read_to_string(path)
    .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))?;

  serde_yaml::from_str(&contents)
    .map_err(|e| eyre!("Failed to parse {}: {}", path.display(), e))
}
