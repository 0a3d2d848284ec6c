//! Course Info Gateway.
//!
//! One interface over the catalog service's course records: read a course's
//! capacity and enrolled count, and overwrite the enrolled count. Transports
//! plug in behind [`CourseGateway`]:
//!
//! - [`HttpCourseGateway`] talks to the catalog's REST API, resolving the
//!   base URL through an [`EndpointResolver`] (a fixed URL or a set of
//!   discovered instances).
//! - [`InMemoryCourseCatalog`] is an in-process double for tests.
//!
//! [`FallbackGateway`] wraps any of them with a per-call timeout and replaces
//! transport failures with a fixed Unavailable response. It never retries.

pub mod course;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod resolver;

pub use common::CourseId;
pub use course::{CatalogEnvelope, CourseView};
pub use error::{GatewayError, Result};
pub use fallback::{FALLBACK_MESSAGE, FallbackGateway};
pub use gateway::{CourseGateway, CourseIdFormat};
pub use http::HttpCourseGateway;
pub use memory::InMemoryCourseCatalog;
pub use resolver::{DiscoveredEndpoints, EndpointResolver, StaticEndpoint};
