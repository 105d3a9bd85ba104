pub mod dedup;
pub mod hub;
pub mod observer;
pub mod order_engine;

pub use dedup::InFlightEvents;
pub use hub::{SubscriberHandle, SubscriberHub, SUBSCRIBER_IDLE_TIMEOUT};
pub use observer::{OrderObserver, TracingObserver};
pub use order_engine::{OrderEngine, FINALIZE_TIMEOUT};
