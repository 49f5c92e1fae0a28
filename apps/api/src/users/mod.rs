// Users API: profile create/update/fetch and saved favourites.
// Everything here is a single-item read or write against `UserStore`.

pub mod favourites;
pub mod handlers;
pub mod profiles;
