//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every handler annotated with `#[utoipa::path]` and
//! registers the two credential schemes: `bearer` for session access tokens
//! and `api_key` for the ingestion `API-Key` header.
//!
//! The generated document is served by Swagger UI in debug builds and
//! exported by the `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AccountType, ApiKeySummary, Error, ErrorAnalysis, ErrorCode, ErrorGroup, ErrorLog,
    IssuedApiKey, Project, TokenPair, User, UserProfile,
};
use crate::inbound::http::api_keys::CreateApiKeyRequest;
use crate::inbound::http::auth::API_KEY_HEADER;
use crate::inbound::http::error_logs::ErrorLogRequest;
use crate::inbound::http::projects::ProjectRequest;
use crate::inbound::http::users::{
    CredentialsRequest, LogoutRequest, ProfileRequest, RefreshRequest,
};

/// Register the bearer token and API key security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/users/login/."))
                    .build(),
            ),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                API_KEY_HEADER,
                "Project API key issued by POST /api/project-integrations/api-keys/create/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Faultline API",
        description = "Multi-tenant error logging: accounts, projects, API keys, ingestion and analysis."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("bearer" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::refresh,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::replace_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::replace_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::api_keys::create_api_key,
        crate::inbound::http::api_keys::list_api_keys,
        crate::inbound::http::api_keys::revoke_api_key,
        crate::inbound::http::error_logs::ingest_error_log,
        crate::inbound::http::error_logs::list_error_logs,
        crate::inbound::http::error_logs::list_error_groups,
        crate::inbound::http::analyzer::analyze_error_log,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        UserProfile,
        AccountType,
        TokenPair,
        Project,
        IssuedApiKey,
        ApiKeySummary,
        ErrorLog,
        ErrorGroup,
        ErrorAnalysis,
        CredentialsRequest,
        RefreshRequest,
        LogoutRequest,
        ProfileRequest,
        ProjectRequest,
        CreateApiKeyRequest,
        ErrorLogRequest,
    )),
    tags(
        (name = "users", description = "Accounts, sessions and profiles"),
        (name = "projects", description = "Project management"),
        (name = "api-keys", description = "Project API keys"),
        (name = "error-logs", description = "Error ingestion and browsing"),
        (name = "analyzer", description = "Error analysis"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("User", "username")]
    #[case("ErrorLog", "error_message")]
    #[case("Project", "uid")]
    #[case("IssuedApiKey", "key")]
    fn schemas_expose_public_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    fn error_log_schema_omits_the_owner() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let RefOr::T(Schema::Object(log)) = schemas.get("ErrorLog").expect("ErrorLog") else {
            panic!("expected Object schema");
        };
        assert!(!log.properties.contains_key("owner"));
    }

    #[rstest]
    #[case("bearer")]
    #[case("api_key")]
    fn security_schemes_are_registered(#[case] scheme: &str) {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key(scheme));
    }

    #[rstest]
    #[case("/api/users/register/")]
    #[case("/api/project-integrations/projects/{id}/")]
    #[case("/api/project-integrations/api-keys/create/")]
    #[case("/api/error-tracker/error-logs/")]
    #[case("/api/analyzer/error-log/{id}/")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
