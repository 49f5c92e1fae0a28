//! Profile moderation queues for the admin dashboard.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;

const MODERATION_JSON: &str = include_str!("../../data/moderation.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingProfile {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub bio: String,
    pub submitted_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedProfile {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub bio: String,
    pub approved_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedProfile {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub bio: String,
    pub report_reason: String,
    pub reported_by: String,
    pub reported_date: String,
}

#[derive(Debug, Default, Deserialize)]
struct Queues {
    pending: Vec<PendingProfile>,
    approved: Vec<ApprovedProfile>,
    reported: Vec<ReportedProfile>,
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Next free numeric id in the approved list. Pending and approved ids are
/// numbered independently, so an approved profile gets a fresh one.
fn next_approved_id(approved: &[ApprovedProfile]) -> String {
    let max = approved
        .iter()
        .filter_map(|p| p.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

fn take_by_id<T>(items: &mut Vec<T>, id: &str, id_of: impl Fn(&T) -> &str) -> Option<T> {
    let index = items.iter().position(|item| id_of(item) == id)?;
    Some(items.remove(index))
}

pub struct ModerationQueues {
    inner: RwLock<Queues>,
}

impl ModerationQueues {
    /// Loads the embedded demo queues.
    pub fn load() -> Result<Self> {
        let queues: Queues =
            serde_json::from_str(MODERATION_JSON).context("embedded moderation.json is malformed")?;
        Ok(Self::from_queues(queues))
    }

    fn from_queues(queues: Queues) -> Self {
        Self {
            inner: RwLock::new(queues),
        }
    }

    pub async fn pending(&self) -> Vec<PendingProfile> {
        self.inner.read().await.pending.clone()
    }

    /// Approved profiles whose name, title or any skill contains `search`
    /// (case-insensitive).
    pub async fn approved(&self, search: Option<&str>) -> Vec<ApprovedProfile> {
        let needle = search.unwrap_or_default().trim().to_lowercase();
        self.inner
            .read()
            .await
            .approved
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.title.to_lowercase().contains(&needle)
                    || p.skills.iter().any(|s| s.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    pub async fn reported(&self) -> Vec<ReportedProfile> {
        self.inner.read().await.reported.clone()
    }

    pub async fn approve(&self, id: &str) -> Result<ApprovedProfile, AppError> {
        let mut queues = self.inner.write().await;
        let pending = take_by_id(&mut queues.pending, id, |p| p.id.as_str())
            .ok_or_else(|| AppError::NotFound(format!("Pending profile {id} not found")))?;

        let approved = ApprovedProfile {
            id: next_approved_id(&queues.approved),
            name: pending.name,
            title: pending.title,
            image: pending.image,
            skills: pending.skills,
            bio: pending.bio,
            approved_date: today(),
        };
        queues.approved.insert(0, approved.clone());
        info!("Approved profile {} ({})", approved.name, approved.id);
        Ok(approved)
    }

    pub async fn reject(&self, id: &str) -> Result<PendingProfile, AppError> {
        let mut queues = self.inner.write().await;
        let rejected = take_by_id(&mut queues.pending, id, |p| p.id.as_str())
            .ok_or_else(|| AppError::NotFound(format!("Pending profile {id} not found")))?;
        info!("Rejected profile {}", rejected.name);
        Ok(rejected)
    }

    /// Drops the report and leaves the profile published.
    pub async fn dismiss_report(&self, id: &str) -> Result<ReportedProfile, AppError> {
        let mut queues = self.inner.write().await;
        let report = take_by_id(&mut queues.reported, id, |p| p.id.as_str())
            .ok_or_else(|| AppError::NotFound(format!("Reported profile {id} not found")))?;
        info!("Dismissed report against {}", report.name);
        Ok(report)
    }

    /// Drops the report and unpublishes any approved profile with the same name.
    pub async fn remove_reported(&self, id: &str) -> Result<ReportedProfile, AppError> {
        let mut queues = self.inner.write().await;
        let report = take_by_id(&mut queues.reported, id, |p| p.id.as_str())
            .ok_or_else(|| AppError::NotFound(format!("Reported profile {id} not found")))?;
        queues.approved.retain(|p| p.name != report.name);
        info!("Removed reported profile {}", report.name);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved(id: &str, name: &str, skills: &[&str]) -> ApprovedProfile {
        ApprovedProfile {
            id: id.into(),
            name: name.into(),
            title: "Trainer".into(),
            image: String::new(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            bio: String::new(),
            approved_date: "2023-04-20".into(),
        }
    }

    fn queues() -> ModerationQueues {
        ModerationQueues::from_queues(Queues {
            pending: vec![PendingProfile {
                id: "1".into(),
                name: "Alex Thompson".into(),
                title: "Gamification Specialist".into(),
                image: String::new(),
                skills: vec!["Gamification".into()],
                bio: String::new(),
                submitted_date: "2023-05-15".into(),
            }],
            approved: vec![
                approved("1", "Sarah Johnson", &["Articulate Storyline"]),
                approved("2", "James Smith", &["Strategy"]),
            ],
            reported: vec![ReportedProfile {
                id: "1".into(),
                name: "James Smith".into(),
                title: "Learning Consultant".into(),
                image: String::new(),
                skills: vec![],
                bio: String::new(),
                report_reason: "Inaccurate credentials".into(),
                reported_by: "user123".into(),
                reported_date: "2023-05-10".into(),
            }],
        })
    }

    #[tokio::test]
    async fn test_embedded_queues_load() {
        let q = ModerationQueues::load().unwrap();
        assert_eq!(q.pending().await.len(), 3);
        assert_eq!(q.approved(None).await.len(), 5);
        assert_eq!(q.reported().await.len(), 2);
    }

    #[tokio::test]
    async fn test_approve_moves_profile_with_fresh_id() {
        let q = queues();
        let approved = q.approve("1").await.unwrap();
        assert_eq!(approved.id, "3");
        assert_eq!(approved.approved_date, today());
        assert!(q.pending().await.is_empty());
        assert_eq!(q.approved(None).await[0].name, "Alex Thompson");
    }

    #[tokio::test]
    async fn test_reject_and_unknown_ids() {
        let q = queues();
        assert!(q.reject("1").await.is_ok());
        assert!(matches!(q.reject("1").await, Err(AppError::NotFound(_))));
        assert!(matches!(q.approve("42").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_over_name_title_and_skills() {
        let q = queues();
        assert_eq!(q.approved(Some("storyline")).await.len(), 1);
        assert_eq!(q.approved(Some("TRAINER")).await.len(), 2);
        assert!(q.approved(Some("nobody")).await.is_empty());
    }

    #[tokio::test]
    async fn test_dismiss_keeps_published_profile() {
        let q = queues();
        q.dismiss_report("1").await.unwrap();
        assert!(q.reported().await.is_empty());
        assert_eq!(q.approved(None).await.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_unpublishes_profile() {
        let q = queues();
        q.remove_reported("1").await.unwrap();
        assert!(q.reported().await.is_empty());
        let names: Vec<String> = q.approved(None).await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Sarah Johnson"]);
    }
}
