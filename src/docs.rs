use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::users::controller::ErrorResponse;
use crate::modules::users::model::{
    LoginRequest, LoginResponse, ProfileResponse, SignUpRequest, SignUpResponse,
};
use todo_auth::Role;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::users::controller::check_email,
        crate::modules::users::controller::sign_up,
        crate::modules::users::controller::sign_in,
        crate::modules::users::controller::promote,
        crate::modules::users::controller::load_profile,
    ),
    components(
        schemas(
            Role,
            SignUpRequest,
            SignUpResponse,
            LoginRequest,
            LoginResponse,
            ProfileResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sign-up, sign-in, profile and promotion")
    ),
    info(
        title = "Todo API",
        version = "0.1.0",
        description = "Stateless bearer-token authentication for the Todo service.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
