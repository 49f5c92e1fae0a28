//! Favourite list edits. Identity of a favourite is its `jobId`.

use crate::models::user::FavouriteJob;

/// Appends `job` unless an entry with the same `jobId` is already present.
/// Returns whether the list changed.
pub fn add_favourite(favourites: &mut Vec<FavouriteJob>, job: FavouriteJob) -> bool {
    if favourites.iter().any(|f| f.job_id == job.job_id) {
        return false;
    }
    favourites.push(job);
    true
}

/// Drops every entry with `job_id`. Absent ids leave the list untouched.
/// Returns whether the list changed.
pub fn remove_favourite(favourites: &mut Vec<FavouriteJob>, job_id: &str) -> bool {
    let before = favourites.len();
    favourites.retain(|f| f.job_id != job_id);
    favourites.len() != before
}
