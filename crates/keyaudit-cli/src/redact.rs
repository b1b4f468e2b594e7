use serde::Serialize;

/// Connection details safe to write into run artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub redacted: String,
}

/// Mask the password and secret query parameters of a connection URL.
pub fn redact_connection(conn: &str) -> RedactedConnection {
    let (base, query) = match conn.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (conn, None),
    };

    let mut connection = RedactedConnection {
        engine: None,
        user: None,
        host: None,
        port: None,
        database: None,
        redacted: base.to_string(),
    };

    if let Some((scheme, rest)) = base.split_once("://") {
        connection.engine = Some(scheme.to_string());

        let (auth, location) = match rest.rsplit_once('@') {
            Some((auth, location)) => (Some(auth), location),
            None => (None, rest),
        };

        let mut authority = String::new();
        if let Some(auth) = auth {
            match auth.split_once(':') {
                Some((user, _)) => {
                    connection.user = Some(user.to_string());
                    authority = format!("{user}:***@");
                }
                None => {
                    connection.user = Some(auth.to_string());
                    authority = format!("{auth}@");
                }
            }
        }

        let (host_port, database) = location.split_once('/').unwrap_or((location, ""));
        match host_port.rsplit_once(':') {
            Some((host, port)) => {
                connection.host = Some(host.to_string());
                connection.port = port.parse().ok();
            }
            None if !host_port.is_empty() => connection.host = Some(host_port.to_string()),
            None => {}
        }
        if !database.is_empty() {
            connection.database = Some(database.to_string());
        }

        connection.redacted = format!("{scheme}://{authority}{location}");
    }

    if let Some(query) = query {
        let params: Vec<String> = query
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some((key, _)) if is_secret(key) => format!("{key}=***"),
                _ => pair.to_string(),
            })
            .collect();
        connection.redacted = format!("{}?{}", connection.redacted, params.join("&"));
    }

    connection
}

fn is_secret(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password" | "pass" | "pwd" | "token" | "api_key" | "apikey"
    )
}
