//! Wire types for the managed backend.
//!
//! Row shapes follow the backend's Portuguese table/column names
//! (`pedidos`, `pagamentos`); the serde renames keep the Rust side idiomatic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zentra_core::{
    AddressId, Money, OrderCode, OrderId, PaymentId, PaymentMethod, PaymentStatus, PreferenceId,
    ProductId, UserId,
};

/// One line of an order-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    #[serde(rename = "produto_id")]
    pub product_id: ProductId,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "preco_unitario")]
    pub unit_price: Money,
}

/// Order-creation request.
///
/// The human-facing code is generated client-side; the backend enforces
/// uniqueness on the column and assigns the durable row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(rename = "usuario_id")]
    pub user_id: UserId,
    #[serde(rename = "endereco_id")]
    pub address_id: AddressId,
    #[serde(rename = "codigo")]
    pub code: OrderCode,
    #[serde(rename = "itens")]
    pub items: Vec<NewOrderItem>,
    pub subtotal: Money,
    #[serde(rename = "frete")]
    pub delivery_fee: Money,
    #[serde(rename = "desconto")]
    pub discount: Money,
    pub total: Money,
}

/// Order row as returned by the backend after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    #[serde(rename = "codigo")]
    pub code: OrderCode,
    pub total: Money,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
}

/// Card fields carried in a payment-creation request.
///
/// The number is masked to its last four digits before it ever reaches this
/// type; raw numbers never leave the sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPayload {
    #[serde(rename = "numero_mascarado")]
    pub masked_number: String,
    #[serde(rename = "titular")]
    pub holder_name: String,
    #[serde(rename = "validade")]
    pub expiry: String,
    #[serde(rename = "cvv")]
    pub security_code: String,
    #[serde(rename = "documento")]
    pub document: String,
}

/// Payment-creation request, always referencing an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    #[serde(rename = "pedido_id")]
    pub order_id: OrderId,
    #[serde(rename = "metodo")]
    pub method: PaymentMethod,
    #[serde(rename = "valor")]
    pub amount: Money,
    #[serde(rename = "parcelas")]
    pub installments: u32,
    #[serde(rename = "cartao", skip_serializing_if = "Option::is_none")]
    pub card: Option<CardPayload>,
    #[serde(rename = "preferencia_id", skip_serializing_if = "Option::is_none")]
    pub preference_id: Option<PreferenceId>,
}

/// Payment row as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    #[serde(rename = "pedido_id")]
    pub order_id: OrderId,
    pub status: PaymentStatus,
}

/// Request body for the `criar-preferencia` serverless function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRequest {
    pub total: Money,
    pub pedido_id: OrderId,
    pub user_id: UserId,
    /// The order's human-facing code; lets the gateway webhook link events
    /// back to the order.
    pub external_reference: OrderCode,
}

/// Response from the `criar-preferencia` serverless function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceResponse {
    pub preference_id: PreferenceId,
    /// Hosted-checkout URL to open in the external browser.
    pub init_point: String,
}
