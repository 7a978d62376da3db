//! Payment handlers: checkout creation, webhook reconciliation, status lookup.

mod create_checkout_session;
mod get_payment_status;
mod handle_payment_webhook;

pub use create_checkout_session::{
    CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult, CORRELATION_PLACEHOLDER,
};
pub use get_payment_status::{GetPaymentStatusHandler, GetPaymentStatusQuery, PaymentStatusView};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
