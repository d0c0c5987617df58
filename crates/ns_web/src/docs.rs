use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::handlers;
use ns_core::{HealthStatus, ServiceInfo, SummarizeRequest, SummarizeResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Russian News Summarizer API",
        version = "1.0.0",
        description = "API for automatic summarization of Russian-language news",
        contact(name = "API support", email = "support@example.com"),
        license(name = "MIT License", url = "https://opensource.org/licenses/MIT")
    ),
    paths(handlers::root, handlers::health, handlers::summarize),
    components(schemas(SummarizeRequest, SummarizeResponse, HealthStatus, ServiceInfo, ErrorBody))
)]
pub struct ApiDoc;
