use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDetail {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub company: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub text: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// A published professional profile as shown on the browse and detail pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Professional {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub title: String,
    pub location: String,
    pub region: String,
    pub image: String,
    pub cover_image: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<u32>,
    pub availability: String,
    pub rate: String,
    pub skills: Vec<String>,
    pub services: Vec<String>,
    pub services_detailed: Vec<ServiceDetail>,
    pub tools: Vec<String>,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
    pub portfolio: Vec<PortfolioItem>,
    pub experience: Vec<ExperienceItem>,
    pub testimonials: Vec<Testimonial>,
    pub contact: ContactDetails,
}

impl Professional {
    /// Lowercased text searched by the free-text filter.
    fn haystack(&self) -> String {
        [
            self.name.as_str(),
            self.title.as_str(),
            self.location.as_str(),
            self.region.as_str(),
            self.bio.as_str(),
        ]
        .into_iter()
        .chain(self.skills.iter().map(String::as_str))
        .chain(self.services.iter().map(String::as_str))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }
}

/// Browse filters. Empty fields match everything; a profile passes the skills
/// (or services) filter when it carries any one of the selected values.
#[derive(Debug, Clone, Default)]
pub struct ProfessionalFilter {
    pub search: String,
    pub skills: Vec<String>,
    pub services: Vec<String>,
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl ProfessionalFilter {
    /// Builds a filter from query parameters; `skills` and `services` are
    /// comma-separated.
    pub fn from_query(search: Option<&str>, skills: Option<&str>, services: Option<&str>) -> Self {
        Self {
            search: search.unwrap_or_default().trim().to_lowercase(),
            skills: split_list(skills),
            services: split_list(services),
        }
    }

    pub fn matches(&self, professional: &Professional) -> bool {
        let matches_text =
            self.search.is_empty() || professional.haystack().contains(&self.search);
        let matches_skills = self.skills.is_empty()
            || professional.skills.iter().any(|s| self.skills.contains(s));
        let matches_services = self.services.is_empty()
            || professional.services.iter().any(|s| self.services.contains(s));
        matches_text && matches_skills && matches_services
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub skills: Vec<String>,
    pub services: Vec<String>,
}

pub struct ProfessionalDirectory {
    profiles: Vec<Professional>,
}

impl ProfessionalDirectory {
    pub fn new(profiles: Vec<Professional>) -> Self {
        Self { profiles }
    }

    pub fn all(&self) -> &[Professional] {
        &self.profiles
    }

    pub fn search(&self, filter: &ProfessionalFilter) -> Vec<Professional> {
        self.profiles
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Professional> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Distinct skills and services across all profiles, sorted.
    pub fn filter_options(&self) -> FilterOptions {
        let skills: BTreeSet<&str> = self
            .profiles
            .iter()
            .flat_map(|p| p.skills.iter().map(String::as_str))
            .collect();
        let services: BTreeSet<&str> = self
            .profiles
            .iter()
            .flat_map(|p| p.services.iter().map(String::as_str))
            .collect();
        FilterOptions {
            skills: skills.into_iter().map(str::to_string).collect(),
            services: services.into_iter().map(str::to_string).collect(),
        }
    }
}
