use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::timestamp_now;
use crate::validation::{has_min_chars, is_valid_email, non_blank};

pub const REQUEST_TYPES: [&str; 4] = ["Full-time", "Part-time", "Contract", "Project-based"];
pub const APPLICATION_METHODS: [&str; 3] = ["Email", "Website", "Platform"];

/// A posting by a business looking for L&D help.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TalentRequest {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub budget: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timeframe: String,
    pub posted: String,
    pub description: String,
    pub detailed_description: String,
    pub skills: Vec<String>,
    pub application_method: String,
    pub contact_info: String,
    pub company_description: String,
    pub company_website: String,
}

impl TalentRequest {
    fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.company.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .skills
                .iter()
                .any(|s| s.to_lowercase().contains(needle))
    }
}

/// Body of `POST /api/talent-requests`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTalentRequest {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub budget: Option<String>,
    pub timeframe: Option<String>,
    pub description: Option<String>,
    pub detailed_description: Option<String>,
    pub company_description: Option<String>,
    pub company_website: Option<String>,
    pub application_method: Option<String>,
    pub contact_info: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for skill in skills {
        let skill = skill.trim().to_string();
        if !skill.is_empty() && !out.contains(&skill) {
            out.push(skill);
        }
    }
    out
}

impl NewTalentRequest {
    /// Checks every field and reports all problems at once.
    pub fn validate(self) -> Result<TalentRequest, AppError> {
        let text = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
        let mut problems: Vec<&str> = Vec::new();

        let title = text(&self.title);
        if !has_min_chars(&title, 5) {
            problems.push("Title must be at least 5 characters.");
        }
        let company = text(&self.company_name);
        if !has_min_chars(&company, 2) {
            problems.push("Company name must be at least 2 characters.");
        }
        let location = text(&self.location);
        if !has_min_chars(&location, 2) {
            problems.push("Location must be at least 2 characters.");
        }
        let kind = text(&self.kind);
        if !REQUEST_TYPES.contains(&kind.as_str()) {
            problems.push("Type must be one of Full-time, Part-time, Contract or Project-based.");
        }
        let budget = text(&self.budget);
        if !has_min_chars(&budget, 2) {
            problems.push("Budget is required.");
        }
        let timeframe = text(&self.timeframe);
        if !has_min_chars(&timeframe, 2) {
            problems.push("Timeframe is required.");
        }
        let description = text(&self.description);
        if !has_min_chars(&description, 50) {
            problems.push("Description must be at least 50 characters.");
        }
        let company_description = text(&self.company_description);
        if !has_min_chars(&company_description, 30) {
            problems.push("Company description must be at least 30 characters.");
        }
        let company_website = text(&self.company_website);
        if !is_http_url(&company_website) {
            problems.push("Please enter a valid URL.");
        }
        let application_method = text(&self.application_method);
        if !APPLICATION_METHODS.contains(&application_method.as_str()) {
            problems.push("Application method must be one of Email, Website or Platform.");
        }

        if !problems.is_empty() {
            return Err(AppError::Validation(problems.join(" ")));
        }

        Ok(TalentRequest {
            id: Uuid::new_v4().to_string(),
            title,
            company,
            location,
            budget,
            kind,
            timeframe,
            posted: "Just now".to_string(),
            detailed_description: non_blank(self.detailed_description)
                .unwrap_or_else(|| description.clone()),
            description,
            skills: dedup_skills(self.skills),
            application_method,
            contact_info: non_blank(self.contact_info).unwrap_or_default(),
            company_description,
            company_website,
        })
    }
}

/// Body of `POST /api/talent-requests/:id/interest`.
#[derive(Debug, Default, Deserialize)]
pub struct InterestRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub received_at: String,
}

impl InterestRequest {
    pub fn validate(self) -> Result<Interest, AppError> {
        let name = non_blank(self.name).unwrap_or_default();
        let email = non_blank(self.email).unwrap_or_default();
        let message = non_blank(self.message).unwrap_or_default();

        let mut problems: Vec<&str> = Vec::new();
        if !has_min_chars(&name, 2) {
            problems.push("Name must be at least 2 characters.");
        }
        if !is_valid_email(&email) {
            problems.push("Please enter a valid email address.");
        }
        if !has_min_chars(&message, 10) {
            problems.push("Message must be at least 10 characters.");
        }
        if !problems.is_empty() {
            return Err(AppError::Validation(problems.join(" ")));
        }

        Ok(Interest {
            name,
            email,
            message,
            received_at: timestamp_now(),
        })
    }
}

/// Talent requests held in process memory, newest first.
pub struct TalentBoard {
    requests: RwLock<Vec<TalentRequest>>,
    interests: RwLock<HashMap<String, Vec<Interest>>>,
}

impl TalentBoard {
    pub fn new(requests: Vec<TalentRequest>) -> Self {
        Self {
            requests: RwLock::new(requests),
            interests: RwLock::new(HashMap::new()),
        }
    }

    /// `kind` of `None` or `"all"` matches every type.
    pub async fn list(&self, search: Option<&str>, kind: Option<&str>) -> Vec<TalentRequest> {
        let needle = search.unwrap_or_default().trim().to_lowercase();
        let kind = kind
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.eq_ignore_ascii_case("all"));

        self.requests
            .read()
            .await
            .iter()
            .filter(|r| needle.is_empty() || r.matches_search(&needle))
            .filter(|r| kind.map_or(true, |k| r.kind.eq_ignore_ascii_case(k)))
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn get(&self, id: &str) -> Option<TalentRequest> {
        self.requests
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub async fn create(&self, request: TalentRequest) -> TalentRequest {
        info!("New talent request {} from {}", request.id, request.company);
        self.requests.write().await.insert(0, request.clone());
        request
    }

    /// Records interest against an existing request; returns how many
    /// expressions of interest it now has.
    pub async fn record_interest(&self, id: &str, interest: Interest) -> Result<usize, AppError> {
        if self.get(id).await.is_none() {
            return Err(AppError::NotFound("Talent request not found".to_string()));
        }
        let mut interests = self.interests.write().await;
        let entries = interests.entry(id.to_string()).or_default();
        entries.push(interest);
        info!("Interest recorded for talent request {id} ({} total)", entries.len());
        Ok(entries.len())
    }
}
