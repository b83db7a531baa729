//! Business logic that needs no I/O.

pub mod access;
pub mod capacity;
pub mod payment_processor;
pub mod pricing;

pub use access::{authorize, AccessDenied, Caller};
pub use capacity::{CapacityExceeded, CapacityMode, Stay};
pub use payment_processor::{
    IntentMetadata, MockPaymentProcessor, PaymentIntent, PaymentProcessor, ProcessorError,
};
