//! Request authentication for the protected registry routes.
//!
//! A deployment runs exactly one [`AuthGate`]:
//!
//! - [`SessionGate`] admits requests whose session carries an identity
//!   established by a prior sign-in against the identity provider.
//! - [`BearerGate`] admits requests presenting a JWT signed by a key from a
//!   remote key set, which [`KeySet`] keeps fresh in the background.

pub mod bearer;
pub mod error;
pub mod gate;
pub mod identity;
pub mod keyset;
pub mod session;

pub use bearer::{BearerGate, BearerGateConfig};
pub use error::AuthError;
pub use gate::AuthGate;
pub use identity::{IdentityProvider, IdentityProviderConfig};
pub use keyset::KeySet;
pub use session::{SignInCallback, SessionGate, SESSION_COOKIE};
