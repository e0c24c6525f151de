pub mod jwt;
pub mod metrics;
pub mod payment_gateway;
pub mod purchase;
pub mod store;
pub mod wallet;

pub use jwt::{JwtService, SessionClaims};
pub use metrics::{get_metrics, init_metrics};
pub use payment_gateway::{MockPaymentGateway, PaymentGateway, StripeGateway};
pub use store::{InMemoryStore, MarketplaceStore, MongoStore};
