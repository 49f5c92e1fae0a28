pub mod handlers;
pub mod professionals;
pub mod talent_requests;

use anyhow::{Context, Result};

use crate::catalog::professionals::{Professional, ProfessionalDirectory};
use crate::catalog::talent_requests::{TalentBoard, TalentRequest};

const PROFESSIONALS_JSON: &str = include_str!("../../data/professionals.json");
const TALENT_REQUESTS_JSON: &str = include_str!("../../data/talent_requests.json");

/// Demo listings served by the browse pages. Professionals are read-only;
/// talent requests accept new postings for the life of the process.
pub struct Catalog {
    pub professionals: ProfessionalDirectory,
    pub talent: TalentBoard,
}

impl Catalog {
    /// Loads the embedded demo data.
    pub fn load() -> Result<Self> {
        let professionals: Vec<Professional> = serde_json::from_str(PROFESSIONALS_JSON)
            .context("embedded professionals.json is malformed")?;
        let requests: Vec<TalentRequest> = serde_json::from_str(TALENT_REQUESTS_JSON)
            .context("embedded talent_requests.json is malformed")?;

        tracing::info!(
            "Catalog loaded: {} professionals, {} talent requests",
            professionals.len(),
            requests.len()
        );

        Ok(Self {
            professionals: ProfessionalDirectory::new(professionals),
            talent: TalentBoard::new(requests),
        })
    }
}
