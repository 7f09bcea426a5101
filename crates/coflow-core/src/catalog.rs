use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    model::{
        ContentId, ContentRecord, Flow, MAX_INTENSITY, MIN_INTENSITY, Step, is_valid_duration,
    },
    persistence::load_json,
};

pub const GESTURE_DIR: &str = "gestures";
pub const FLOW_DIR: &str = "flows";
pub const GESTURE_FILE: &str = "gesture.json";
pub const FLOW_FILE: &str = "flow.json";

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("content not found: {0}")]
    ContentNotFound(ContentId),
    #[error("flow not found: {0}")]
    FlowNotFound(String),
    #[error("flow has no steps: {0}")]
    EmptyFlow(String),
    #[error("invalid duration for {id}: {duration_sec}")]
    InvalidDuration { id: ContentId, duration_sec: f64 },
}

pub trait ContentLookup: Send + Sync {
    fn lookup(&self, id: &ContentId) -> Option<Arc<ContentRecord>>;

    fn media_path(&self, content: &ContentRecord, file_name: &str) -> PathBuf;
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    root: PathBuf,
    gestures: BTreeMap<ContentId, Arc<ContentRecord>>,
    flows: BTreeMap<String, Flow>,
}

impl Catalog {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            gestures: BTreeMap::new(),
            flows: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_records(
        root: impl Into<PathBuf>,
        gestures: impl IntoIterator<Item = ContentRecord>,
        flows: impl IntoIterator<Item = Flow>,
    ) -> Self {
        let mut catalog = Self::new(root);
        for gesture in gestures {
            catalog.insert_gesture(gesture);
        }
        for flow in flows {
            catalog.insert_flow(flow);
        }
        catalog
    }

    /// Loads every `gestures/*/gesture.json` and `flows/*/flow.json` under
    /// `root`. Unreadable or malformed entries are skipped with a warning.
    #[instrument(fields(root = %root.display()))]
    pub fn load_dir(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(anyhow::anyhow!(
                "content root is not a directory: {}",
                root.display()
            ));
        }

        let mut catalog = Self::new(root);
        for path in collect_documents(&root.join(GESTURE_DIR), GESTURE_FILE) {
            match load_json::<ContentRecord>(&path) {
                Ok(gesture) => catalog.insert_gesture(gesture),
                Err(error) => warn!(path = %path.display(), ?error, "skipping invalid gesture"),
            }
        }
        for path in collect_documents(&root.join(FLOW_DIR), FLOW_FILE) {
            match load_json::<Flow>(&path) {
                Ok(flow) => catalog.insert_flow(flow),
                Err(error) => warn!(path = %path.display(), ?error, "skipping invalid flow"),
            }
        }

        info!(
            gestures = catalog.gestures.len(),
            flows = catalog.flows.len(),
            "content catalog loaded"
        );
        Ok(catalog)
    }

    pub fn insert_gesture(&mut self, gesture: ContentRecord) {
        self.gestures.insert(gesture.id.clone(), Arc::new(gesture));
    }

    pub fn insert_flow(&mut self, flow: Flow) {
        self.flows.insert(flow.id.clone(), flow);
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn gestures(&self) -> impl Iterator<Item = &Arc<ContentRecord>> {
        self.gestures.values()
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn flow(&self, id: &str) -> Result<&Flow, CatalogError> {
        self.flows
            .get(id)
            .ok_or_else(|| CatalogError::FlowNotFound(id.to_string()))
    }
}

impl ContentLookup for Catalog {
    fn lookup(&self, id: &ContentId) -> Option<Arc<ContentRecord>> {
        self.gestures.get(id).cloned()
    }

    fn media_path(&self, content: &ContentRecord, file_name: &str) -> PathBuf {
        self.root
            .join(GESTURE_DIR)
            .join(content.id.as_str())
            .join(file_name)
    }
}

/// Resolves every flow step against the catalog; one unknown id or
/// non-positive duration fails the whole flow.
pub fn resolve_flow(flow: &Flow, lookup: &dyn ContentLookup) -> Result<Vec<Step>, CatalogError> {
    if flow.steps.is_empty() {
        return Err(CatalogError::EmptyFlow(flow.id.clone()));
    }

    flow.steps
        .iter()
        .map(|flow_step| {
            let content = lookup
                .lookup(&flow_step.gesture_id)
                .ok_or_else(|| CatalogError::ContentNotFound(flow_step.gesture_id.clone()))?;
            check_duration(&flow_step.gesture_id, flow_step.duration_sec)?;
            Ok(Step {
                content,
                duration_sec: flow_step.duration_sec,
                side: flow_step.side,
                notes: flow_step.notes.clone(),
                title: flow_step.title.clone(),
            })
        })
        .collect()
}

pub fn steps_for_content(
    id: &ContentId,
    lookup: &dyn ContentLookup,
) -> Result<Vec<Step>, CatalogError> {
    let content = lookup
        .lookup(id)
        .ok_or_else(|| CatalogError::ContentNotFound(id.clone()))?;
    let step = Step::with_default_duration(content);
    check_duration(id, step.duration_sec)?;
    Ok(vec![step])
}

pub fn check_steps(steps: &[Step]) -> Result<(), CatalogError> {
    steps
        .iter()
        .try_for_each(|step| check_duration(step.content_ref(), step.duration_sec))
}

fn check_duration(id: &ContentId, duration_sec: f64) -> Result<(), CatalogError> {
    if is_valid_duration(duration_sec) {
        Ok(())
    } else {
        Err(CatalogError::InvalidDuration {
            id: id.clone(),
            duration_sec,
        })
    }
}

/// Distinct contraindications across a session, in first-seen order. A
/// non-empty result means the host asks for confirmation before playing.
#[must_use]
pub fn safety_considerations(steps: &[Step]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    steps
        .iter()
        .flat_map(|step| step.content.contraindications.iter())
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

#[must_use]
pub fn validate_flow(flow: &Flow, lookup: &dyn ContentLookup) -> Vec<String> {
    let mut problems = Vec::new();
    if flow.name.trim().is_empty() {
        problems.push("Flow name is required".to_string());
    }
    if flow.steps.is_empty() {
        problems.push("Flow must have at least one step".to_string());
    }

    for (index, step) in flow.steps.iter().enumerate() {
        let number = index + 1;
        if lookup.lookup(&step.gesture_id).is_none() {
            problems.push(format!(
                "Step {number}: gesture \"{}\" not found",
                step.gesture_id
            ));
        }
        if !is_valid_duration(step.duration_sec) {
            problems.push(format!("Step {number}: duration must be positive"));
        }
    }
    problems
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub gesture_count: usize,
    pub flow_count: usize,
    pub problems: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Lints the content directory: id/folder agreement, required fields, audio
/// presence, duration ordering, intensity range and flow references.
#[instrument(fields(root = %root.display()))]
pub fn validate_catalog(root: &Path) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();
    let mut known_ids = BTreeSet::new();

    let gesture_paths = collect_documents(&root.join(GESTURE_DIR), GESTURE_FILE);
    report.gesture_count = gesture_paths.len();
    for path in &gesture_paths {
        let label = relative_label(root, path);
        let gesture = match load_json::<ContentRecord>(path) {
            Ok(gesture) => gesture,
            Err(error) => {
                report.problems.push(format!("{label}: {error:#}"));
                continue;
            }
        };

        let slug = folder_slug(path);
        if gesture.id.as_str() == slug {
            known_ids.insert(gesture.id.clone());
        } else {
            report.problems.push(format!(
                "{label}: id mismatch, expected \"{slug}\", got \"{}\"",
                gesture.id
            ));
        }
        if gesture.name.trim().is_empty() {
            report.problems.push(format!("{label}: missing name"));
        }
        if gesture.media.audio.trim().is_empty() {
            report.problems.push(format!("{label}: missing audio"));
        } else if !path
            .parent()
            .is_some_and(|dir| dir.join(&gesture.media.audio).is_file())
        {
            report.problems.push(format!(
                "{label}: audio file not found at {}",
                gesture.media.audio
            ));
        }

        let durations = gesture.duration_defaults;
        if !is_valid_duration(durations.default_sec) {
            report.problems.push(format!(
                "{label}: durationDefaults.defaultSec must be positive, got {}",
                durations.default_sec
            ));
        }
        if durations.min_sec > durations.default_sec || durations.default_sec > durations.max_sec
        {
            report.problems.push(format!(
                "{label}: durationDefaults out of order (min <= default <= max)"
            ));
        }
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&gesture.intensity) {
            report.problems.push(format!(
                "{label}: intensity must be {MIN_INTENSITY}-{MAX_INTENSITY}, got {}",
                gesture.intensity
            ));
        }
    }

    let flow_paths = collect_documents(&root.join(FLOW_DIR), FLOW_FILE);
    report.flow_count = flow_paths.len();
    for path in &flow_paths {
        let label = relative_label(root, path);
        let flow = match load_json::<Flow>(path) {
            Ok(flow) => flow,
            Err(error) => {
                report.problems.push(format!("{label}: {error:#}"));
                continue;
            }
        };

        let slug = folder_slug(path);
        if flow.id != slug {
            report.problems.push(format!(
                "{label}: id mismatch, expected \"{slug}\", got \"{}\"",
                flow.id
            ));
        }
        if flow.name.trim().is_empty() {
            report.problems.push(format!("{label}: missing name"));
        }
        if flow.steps.is_empty() {
            report.problems.push(format!("{label}: flow has no steps"));
        }
        for (index, step) in flow.steps.iter().enumerate() {
            if !known_ids.contains(&step.gesture_id) {
                report.problems.push(format!(
                    "{label}: step {index} references unknown gesture \"{}\"",
                    step.gesture_id
                ));
            }
            if !is_valid_duration(step.duration_sec) {
                report.problems.push(format!(
                    "{label}: step {index} has invalid durationSec: {}",
                    step.duration_sec
                ));
            }
        }
    }

    debug!(
        gestures = report.gesture_count,
        flows = report.flow_count,
        problems = report.problems.len(),
        "content validation complete"
    );
    Ok(report)
}

fn collect_documents(directory: &Path, file_name: &str) -> Vec<PathBuf> {
    if !directory.is_dir() {
        debug!(directory = %directory.display(), "content directory missing");
        return Vec::new();
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(directory)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(?error, "ignoring unreadable entry while scanning content");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();
    paths
}

fn folder_slug(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|value| value.to_str())
        .unwrap_or_default()
        .to_string()
}

fn relative_label(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
