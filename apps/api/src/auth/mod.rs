// Authentication: sign-up, confirmation, sign-in against a hosted identity
// provider, plus decoding of the issued ID token into a request-scoped session.

pub mod cognito;
pub mod handlers;
pub mod provider;
pub mod session;
