//! Business logic services.

pub mod auth;
pub mod checkout;
pub mod payment;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use checkout::CheckoutService;
pub use payment::{PaymentClient, PaymentError};
pub use token::TokenService;
