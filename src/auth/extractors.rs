use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use base64ct::{Base64, Encoding};
use tracing::{debug, warn};

use super::password::{verify_against_dummy, verify_password};
use crate::{
    error::ApiError, state::AppState, store::CatalogStore, users::repo_types::User,
};

/// Credentials carried by an `Authorization: Basic` header.
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub pass: String,
}

/// Decodes `Basic <base64(name:pass)>`. The error names what was wrong, for logs only.
pub fn parse_basic(header: &str) -> Result<Credentials, &'static str> {
    let (scheme, encoded) = header
        .trim()
        .split_once(' ')
        .ok_or("missing auth scheme")?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err("auth scheme is not basic");
    }
    let decoded = Base64::decode_vec(encoded.trim()).map_err(|_| "credentials are not base64")?;
    let decoded = String::from_utf8(decoded).map_err(|_| "credentials are not utf-8")?;
    let (name, pass) = decoded.split_once(':').ok_or("credentials lack ':'")?;
    Ok(Credentials {
        name: name.to_string(),
        pass: pass.to_string(),
    })
}

/// Resolves credentials to a user. Every failure is the same 401.
pub async fn authenticate(
    store: &dyn CatalogStore,
    creds: &Credentials,
) -> Result<User, ApiError> {
    let Some(user) = store.find_user_by_email(&creds.name).await? else {
        verify_against_dummy(&creds.pass);
        warn!(email = %creds.name, "user not found for basic auth");
        return Err(ApiError::Unauthorized);
    };

    match verify_password(&creds.pass, &user.password_hash) {
        Ok(true) => {
            debug!(user_id = user.id, "authentication successful");
            Ok(user)
        }
        Ok(false) => {
            warn!(user_id = user.id, "authentication failure: wrong password");
            Err(ApiError::Unauthorized)
        }
        Err(e) => {
            warn!(user_id = user.id, error = %e, "authentication failure: unreadable hash");
            Err(ApiError::Unauthorized)
        }
    }
}

/// The user authenticated by basic auth for this request.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
        else {
            warn!("auth header not found");
            return Err(ApiError::Unauthorized);
        };

        let creds = parse_basic(header).map_err(|reason| {
            warn!(reason, "malformed authorization header");
            ApiError::Unauthorized
        })?;

        authenticate(state.store.as_ref(), &creds).await.map(CurrentUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{basic_auth, seed_user};
    use crate::store::MemoryStore;

    #[test]
    fn parses_basic_header() {
        let creds = parse_basic(&basic_auth("joe@smith.com", "pa:ss")).unwrap();
        assert_eq!(
            creds,
            Credentials {
                name: "joe@smith.com".into(),
                pass: "pa:ss".into(),
            }
        );
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let header = basic_auth("a@b.io", "x").replacen("Basic", "bAsIc", 1);
        assert!(parse_basic(&header).is_ok());
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(parse_basic("Bearer abc").is_err());
        assert!(parse_basic("Basic").is_err());
        assert!(parse_basic("Basic !!!").is_err());
        // "nocolon" in base64
        assert!(parse_basic("Basic bm9jb2xvbg==").is_err());
    }

    #[tokio::test]
    async fn authenticate_accepts_only_the_right_password() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "joe@smith.com", "secret").await;

        let ok = authenticate(
            &store,
            &Credentials {
                name: "joe@smith.com".into(),
                pass: "secret".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(ok.id, user.id);

        let wrong = authenticate(
            &store,
            &Credentials {
                name: "joe@smith.com".into(),
                pass: "nope".into(),
            },
        )
        .await;
        assert!(matches!(wrong, Err(ApiError::Unauthorized)));

        let unknown = authenticate(
            &store,
            &Credentials {
                name: "ghost@smith.com".into(),
                pass: "secret".into(),
            },
        )
        .await;
        assert!(matches!(unknown, Err(ApiError::Unauthorized)));
    }
}
