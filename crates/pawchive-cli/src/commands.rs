//! Subcommand implementations

use crate::config::PawchiveConfig;
use anyhow::{bail, Context, Result};
use futures::future::join_all;
use pawchive_model::{
    text_or_placeholder, AdoptionRequest, SponsorshipRequest, StrayDraft, StrayId, StrayRecord,
    StrayStatus, VaccinationEntry,
};
use pawchive_roster::{
    apply_filter, Category, FetchOutcome, LoadKind, RosterView, RosterViewModel,
};
use pawchive_store::{
    upload_photo, BlobStorage, DataSource, SelectQuery, StoreError, StrayMutation, StrayQuery,
};
use std::path::Path;

/// Search text plus category chip
#[derive(Debug, Clone, Default)]
pub(crate) struct Filter {
    pub(crate) query: String,
    pub(crate) category: Category,
}

/// Column values given on the command line
///
/// Unset fields leave the draft as it is.
#[derive(Debug, Clone, Default)]
pub(crate) struct DraftEdits {
    pub(crate) name: Option<String>,
    pub(crate) breed: Option<String>,
    pub(crate) gender: Option<String>,
    pub(crate) age: Option<String>,
    pub(crate) weight: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) status: Option<StrayStatus>,
    pub(crate) rescue_date: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) vaccinations: Option<Vec<VaccinationEntry>>,
}

impl DraftEdits {
    pub(crate) fn apply(self, draft: &mut StrayDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        for (slot, value) in [
            (&mut draft.breed, self.breed),
            (&mut draft.gender, self.gender),
            (&mut draft.age, self.age),
            (&mut draft.weight, self.weight),
            (&mut draft.location, self.location),
            (&mut draft.rescue_date, self.rescue_date),
            (&mut draft.bio, self.bio),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if self.vaccinations.is_some() {
            draft.vaccinations = self.vaccinations;
        }
    }

    /// Fresh draft for an insert
    pub(crate) fn into_draft(self) -> StrayDraft {
        let mut draft = StrayDraft::new("");
        self.apply(&mut draft);
        draft
    }
}

fn print_rows(rows: &[&StrayRecord]) {
    if rows.is_empty() {
        println!("no strays match");
        return;
    }
    for record in rows {
        println!(
            "{:>6}  {:<16} {:<11} {}",
            record.id.as_str(),
            record.name,
            record.status.as_str(),
            text_or_placeholder(record.location.as_deref()),
        );
    }
}

async fn load(config: &PawchiveConfig, source: DataSource) -> Result<RosterViewModel> {
    let roster = RosterViewModel::new(source, config.roster.clone());
    match roster.fetch(LoadKind::Initial).await {
        FetchOutcome::Failed { message, .. } => bail!("failed to load strays: {message}"),
        _ => Ok(roster),
    }
}

/// Print the filtered roster once
pub(crate) async fn list(
    config: &PawchiveConfig,
    source: DataSource,
    filter: &Filter,
    json: bool,
) -> Result<()> {
    let roster = load(config, source).await?;
    let shown = roster.visible(&filter.query, filter.category);
    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        print_rows(&shown.iter().collect::<Vec<_>>());
    }
    roster.teardown().await;
    Ok(())
}

/// Print one stray's detail view
pub(crate) async fn show(config: &PawchiveConfig, source: DataSource, id: &StrayId) -> Result<()> {
    let roster = load(config, source).await?;
    let Some(detail) = roster.detail(id) else {
        bail!("no stray with id {id}");
    };

    let record = &detail.record;
    println!("{} [{}]", record.name, record.status);
    println!("Photo:        {}", detail.image_url);
    println!("Breed:        {}", text_or_placeholder(record.breed.as_deref()));
    for (label, value) in detail.info_rows() {
        println!("{:<13} {}", format!("{label}:"), value);
    }
    println!(
        "Vaccinations: {} completed ({} pending)",
        detail.vaccinations,
        detail.vaccinations.pending()
    );
    for entry in &record.vaccinations {
        println!("  - {:<20} {:<12} {}", entry.name, entry.date, entry.status.as_str());
    }
    if let Some(bio) = &record.bio {
        println!();
        println!("{bio}");
    }
    roster.teardown().await;
    Ok(())
}

/// Mount a live roster and print the projection after every change
pub(crate) async fn watch(config: &PawchiveConfig, source: DataSource, filter: &Filter) -> Result<()> {
    let roster = RosterViewModel::new(source, config.roster.clone());
    let mut states = roster.watch();
    roster.mount().await.context("failed to mount roster")?;
    tracing::info!(query = %filter.query, category = %filter.category, "watching roster, Ctrl-C to stop");

    loop {
        {
            let state = states.borrow_and_update();
            match state.view() {
                RosterView::Loading => println!("loading..."),
                RosterView::Error(message) => println!("error: {message}"),
                RosterView::Empty => println!("no strays yet"),
                RosterView::Rows(rows) => {
                    println!("--- {} strays ({})", rows.len(), state.phase);
                    print_rows(&apply_filter(rows, &filter.query, filter.category));
                }
            }
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    roster.teardown().await;
    Ok(())
}

async fn attach_photo<B: BlobStorage>(
    config: &PawchiveConfig,
    backend: &B,
    draft: StrayDraft,
    photo: Option<&Path>,
) -> Result<StrayDraft> {
    let Some(path) = photo else {
        return Ok(draft);
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read photo {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("photo path has no file name")?;
    let url = upload_photo(backend, &config.backend.photo_bucket, file_name, bytes)
        .await
        .context("photo upload failed")?;
    Ok(draft.with_image_url(url))
}

/// Insert a stray, uploading its photo first
pub(crate) async fn add<B>(
    config: &PawchiveConfig,
    backend: &B,
    edits: DraftEdits,
    photo: Option<&Path>,
) -> Result<StrayRecord>
where
    B: StrayMutation + BlobStorage,
{
    let draft = edits.into_draft().validate()?;
    let draft = attach_photo(config, backend, draft, photo).await?;

    let record = backend
        .insert(&config.roster.collection, &draft)
        .await
        .context("failed to add stray")?;
    println!("added {} ({})", record.name, record.id);
    Ok(record)
}

/// Overwrite a stray's columns, starting from its stored values
pub(crate) async fn edit<B>(
    config: &PawchiveConfig,
    backend: &B,
    id: &StrayId,
    edits: DraftEdits,
    photo: Option<&Path>,
) -> Result<StrayRecord>
where
    B: StrayQuery + StrayMutation + BlobStorage,
{
    let collection = config.roster.collection.as_str();
    let rows = backend
        .select(&SelectQuery::newest_first(collection))
        .await
        .context("failed to load strays")?;
    let current = rows
        .iter()
        .find(|r| r.id == *id)
        .with_context(|| format!("no stray with id {id}"))?;

    let mut draft = StrayDraft::from(current);
    edits.apply(&mut draft);
    let draft = attach_photo(config, backend, draft.validate()?, photo).await?;

    let record = backend
        .update(collection, id, &draft)
        .await
        .with_context(|| format!("failed to update stray {id}"))?;
    println!("updated {} ({})", record.name, record.id);
    Ok(record)
}

/// Delete every id concurrently, one result per id in input order
pub(crate) async fn delete_each<B: StrayMutation>(
    backend: &B,
    collection: &str,
    ids: &[StrayId],
) -> Vec<Result<(), StoreError>> {
    join_all(ids.iter().map(|id| backend.delete(collection, id))).await
}

/// Delete strays by id
///
/// Every id is attempted; the command fails if any delete did.
pub(crate) async fn remove<B: StrayMutation>(
    config: &PawchiveConfig,
    backend: &B,
    ids: &[StrayId],
) -> Result<()> {
    let results = delete_each(backend, &config.roster.collection, ids).await;

    let mut failed = 0usize;
    for (id, result) in ids.iter().zip(&results) {
        match result {
            Ok(()) => println!("removed {id}"),
            Err(e) => {
                failed += 1;
                tracing::warn!(%id, error = %e, "remove failed");
                eprintln!("failed to remove {id}: {e}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} removals failed", ids.len());
    }
    Ok(())
}

/// Confirmation shown once an adoption application passes validation
pub(crate) fn adoption_confirmation(request: &AdoptionRequest, stray_name: &str) -> Result<String> {
    request.validate()?;
    Ok(format!(
        "Adoption request for {stray_name} submitted by {}. We'll review it and contact you at {}.",
        request.full_name.trim(),
        request.email.trim(),
    ))
}

/// Confirmation shown once a sponsorship pledge passes validation
pub(crate) fn sponsorship_confirmation(
    request: &SponsorshipRequest,
    stray_name: &str,
) -> Result<String> {
    let amount = request.resolve_amount()?;
    let tier = request
        .tier
        .map(|t| format!(" ({} tier)", t.label()))
        .unwrap_or_default();
    Ok(format!(
        "Your \u{20b1}{amount}{tier} sponsorship for {stray_name} has been submitted."
    ))
}

async fn stray_name(config: &PawchiveConfig, source: DataSource, id: &StrayId) -> Result<String> {
    let roster = load(config, source).await?;
    let name = roster.find(id).map(|r| r.name);
    roster.teardown().await;
    name.with_context(|| format!("no stray with id {id}"))
}

/// Validate an adoption application for a listed stray
///
/// Applications are checked and confirmed locally; nothing is stored.
pub(crate) async fn adopt(
    config: &PawchiveConfig,
    source: DataSource,
    request: &AdoptionRequest,
) -> Result<()> {
    request.validate()?;
    let id = request.stray_id.as_ref().context("missing stray id")?;
    let name = stray_name(config, source, id).await?;
    println!("{}", adoption_confirmation(request, &name)?);
    tracing::info!(stray = %id, "adoption request accepted");
    Ok(())
}

/// Validate a sponsorship pledge for a listed stray
///
/// No payment is taken.
pub(crate) async fn sponsor(
    config: &PawchiveConfig,
    source: DataSource,
    request: &SponsorshipRequest,
) -> Result<()> {
    request.resolve_amount()?;
    let id = request.stray_id.as_ref().context("missing stray id")?;
    let name = stray_name(config, source, id).await?;
    println!("{}", sponsorship_confirmation(request, &name)?);
    tracing::info!(stray = %id, "sponsorship pledge accepted");
    Ok(())
}
