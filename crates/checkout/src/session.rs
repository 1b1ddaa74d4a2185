//! Session read model consumed by checkout preparation.
//!
//! Token management and sign-in/sign-out live in the identity provider SDK;
//! this module only models what the checkout flow needs to know: who the
//! user is and whether a delivery address is on file.

use serde::{Deserialize, Serialize};
use zentra_core::{AddressId, UserId};

/// The authenticated user, as resident in application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
}

/// Application session state relevant to checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<UserIdentity>,
    delivery_address: Option<AddressId>,
}

impl Session {
    /// An anonymous session with no address on file.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user: None,
            delivery_address: None,
        }
    }

    /// A signed-in session, optionally with a delivery address.
    #[must_use]
    pub const fn signed_in(user: UserIdentity, delivery_address: Option<AddressId>) -> Self {
        Self {
            user: Some(user),
            delivery_address,
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    /// The delivery address on file, if any.
    #[must_use]
    pub const fn delivery_address(&self) -> Option<AddressId> {
        self.delivery_address
    }

    /// Record the address created from the "add an address" prompt.
    pub fn set_delivery_address(&mut self, address: AddressId) {
        self.delivery_address = Some(address);
    }
}
