use std::path::Path;

use reqwest::Url;

use crate::error::CoreError;

/// Basic-auth credentials sent with every RPC request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Credentials {
    pub(super) user: String,
    pub(super) pass: String,
}

impl Credentials {
    fn new(user: &str, pass: &str) -> Self {
        Self {
            user: user.to_owned(),
            pass: pass.to_owned(),
        }
    }
}

/// Node endpoint with any credentials embedded in the URL moved out of it.
#[derive(Debug)]
pub(super) struct Endpoint {
    pub(super) url: Url,
    pub(super) embedded: Option<Credentials>,
}

/// Validate an `http(s)://[user:pass@]host:port[/path]` endpoint.
pub(super) fn parse_endpoint(connection: &str) -> Result<Endpoint, CoreError> {
    let mut url = Url::parse(connection).map_err(|e| {
        CoreError::Config(format!(
            "invalid rpc url `{connection}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CoreError::Config(format!(
            "unsupported rpc url scheme `{}`; expected http or https",
            url.scheme()
        )));
    }

    let embedded = match (url.username(), url.password()) {
        ("", _) => None,
        (user, Some(pass)) => Some(Credentials::new(user, pass)),
        (_, None) => {
            return Err(CoreError::Config(
                "rpc url carries a user name but no password".to_owned(),
            ))
        }
    };
    if embedded.is_some() {
        url.set_username("")
            .and_then(|()| url.set_password(None))
            .map_err(|()| CoreError::Config("cannot strip credentials from rpc url".to_owned()))?;
    }

    Ok(Endpoint { url, embedded })
}

/// Pick credentials in precedence order: explicit user and password, then
/// credentials embedded in the URL, then the node's cookie file.
pub(super) fn resolve_credentials(
    user: Option<&str>,
    pass: Option<&str>,
    embedded: Option<Credentials>,
    cookie_file: Option<&Path>,
) -> Result<Option<Credentials>, CoreError> {
    match (user, pass) {
        (Some(user), Some(pass)) => return Ok(Some(Credentials::new(user, pass))),
        (None, None) => {}
        _ => {
            return Err(CoreError::Config(
                "rpc user and rpc password must be set together".to_owned(),
            ))
        }
    }
    if embedded.is_some() {
        return Ok(embedded);
    }
    cookie_file.map(read_cookie).transpose()
}

/// Bitcoin Core writes `__cookie__:<random>` to `<datadir>/.cookie`.
fn read_cookie(path: &Path) -> Result<Credentials, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Config(format!("cannot read rpc cookie {}: {e}", path.display()))
    })?;

    content
        .lines()
        .next()
        .map(str::trim)
        .and_then(|line| line.split_once(':'))
        .filter(|(user, pass)| !user.is_empty() && !pass.is_empty())
        .map(|(user, pass)| Credentials::new(user, pass))
        .ok_or_else(|| {
            CoreError::Config(format!(
                "rpc cookie {} must start with a non-empty `user:password` line",
                path.display()
            ))
        })
}
