use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Estaciona API",
        version = "0.1.0",
        description = r#"
# Estaciona parking access API

Backend for the campus parking gate and mobile client.

## Features

- **Users**: list users with their vehicle, move a user between buildings
- **Door**: flag the entry door for the gate controller
- **Places**: list places, assign a free place near the user's building, release it

## Allocation

A user is placed in their current building when it has a free, enabled
place (lowest `place_id` first). Otherwise the configured fallback zones are
tried in order. `edificio` in the response is the short code of the zone the
place was found in.

## Aliases

Every route is also served under an English path: `/users`,
`/set_requested_entry`, `/update_exit_and_reset`, `/updateBuilding`,
`/get_places`, `/assign_place`, `/release_place`.

## Error Handling

Failures use HTTP status codes and a single body shape:

```json
{
  "status": "Error",
  "error": "Not Found",
  "message": "No spots available: No hay lugares disponibles",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "users", description = "User listing and building updates"),
        (name = "doors", description = "Entry door requests"),
        (name = "places", description = "Parking place listing and allocation")
    ),
    paths(
        crate::handlers::users::list_users,
        crate::handlers::users::update_building,
        crate::handlers::users::exit_and_reset,
        crate::handlers::doors::request_entry,
        crate::handlers::places::list_places,
        crate::handlers::places::assign_place,
        crate::handlers::places::release_place,
    ),
    components(
        schemas(
            crate::handlers::common::TuitionRequest,
            crate::handlers::common::UpdateBuildingRequest,
            crate::handlers::common::StatusResponse,
            crate::handlers::users::UserSummary,
            crate::handlers::places::PlaceSummary,
            crate::handlers::places::AssignPlaceResponse,
            crate::handlers::places::ReleasePlaceResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
