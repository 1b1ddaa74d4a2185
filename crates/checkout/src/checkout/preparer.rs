//! Checkout preparation: precondition checks and the context snapshot.

use thiserror::Error;
use zentra_core::{AddressId, Money, UserId};

use crate::cart::{CartLine, CartStore};
use crate::session::Session;

/// Precondition failures surfaced before any network call.
///
/// Each variant maps to an actionable prompt in the shell: `AddressRequired`
/// navigates to address creation, `Unauthenticated` to sign-in.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PrepareError {
    /// The cart has no lines; the finalize control should not have fired.
    #[error("cart is empty")]
    EmptyCart,

    /// No authenticated user identity exists.
    #[error("not signed in")]
    Unauthenticated,

    /// No delivery address is on file for the user.
    #[error("a delivery address is required")]
    AddressRequired,
}

/// Ephemeral, request-scoped checkout snapshot.
///
/// Constructed once per checkout attempt and consumed by value on
/// submission; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutContext {
    pub user_id: UserId,
    pub delivery_address_id: AddressId,
    /// Cart lines as they were at preparation time.
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    /// Currently always zero; kept structural for the order request.
    pub delivery_fee: Money,
    /// Currently always zero; kept structural for the order request.
    pub discount: Money,
    pub total: Money,
}

/// Validate checkout preconditions and snapshot the cart.
///
/// No network calls are made; identity and address state are assumed
/// already resident in the session.
///
/// # Errors
///
/// Returns [`PrepareError`] if the cart is empty, no user is signed in, or
/// no delivery address is on file.
pub fn prepare_checkout(
    session: &Session,
    cart: &CartStore,
) -> Result<CheckoutContext, PrepareError> {
    let lines = cart.lines();
    if lines.is_empty() {
        return Err(PrepareError::EmptyCart);
    }

    let user = session.user().ok_or(PrepareError::Unauthenticated)?;
    let delivery_address_id = session
        .delivery_address()
        .ok_or(PrepareError::AddressRequired)?;

    let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
    let delivery_fee = Money::ZERO;
    let discount = Money::ZERO;
    let total = subtotal + delivery_fee - discount;

    Ok(CheckoutContext {
        user_id: user.id,
        delivery_address_id,
        lines,
        subtotal,
        delivery_fee,
        discount,
        total,
    })
}
