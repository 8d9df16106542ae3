use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims read from an identity provider token. Issuer and audience are
/// checked by the validator, not carried here.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub exp: usize,
}
