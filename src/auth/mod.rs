/// Authentication and authorization
///
/// Token issuance/validation (`tokens`), request identity extraction
/// (`extractors`), password hashing (`passwords`), and per-object ownership
/// checks (`permissions`). The web and API surfaces share one identity model
/// but fail differently: web routes redirect anonymous users to the login
/// entry point, API routes answer 401.
pub mod extractors;
pub mod passwords;
pub mod permissions;
pub mod tokens;

pub use extractors::{ApiUser, AuthedUser, Viewer, WebUser};
pub use passwords::{hash_password, verify_password};
pub use tokens::{Claims, TokenManager, TokenPair};
